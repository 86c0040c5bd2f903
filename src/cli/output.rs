//! CLI output handling for butterfly-alt
//!
//! Writes the merged response to stdout or a file, honoring the overwrite flags.

use std::io::Write;

use tokio::io::AsyncWriteExt;

use butterfly_alt::{Error, Result, RouteResponse};

/// Output destination types
#[derive(Debug, PartialEq)]
pub enum OutputDestination {
    File(String),
    Stdout,
}

impl OutputDestination {
    /// `-` or nothing means stdout, anything else is a file path
    pub fn resolve(output: &str) -> Self {
        if output.is_empty() || output == "-" {
            OutputDestination::Stdout
        } else {
            OutputDestination::File(output.to_string())
        }
    }
}

/// Overwrite behavior for existing files
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OverwriteBehavior {
    /// Prompt user for confirmation (default)
    #[default]
    Prompt,
    /// Force overwrite without prompting
    Force,
    /// Never overwrite, fail if file exists
    NeverOverwrite,
}

/// Check if destination file exists and handle overwrite behavior
fn check_overwrite_permission(file_path: &str, behavior: &OverwriteBehavior) -> Result<bool> {
    if !std::path::Path::new(file_path).exists() {
        return Ok(true);
    }

    match behavior {
        OverwriteBehavior::Force => {
            eprintln!("⚠️  Overwriting existing file: {file_path}");
            Ok(true)
        }
        OverwriteBehavior::NeverOverwrite => Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("File already exists: {file_path} (use --force to overwrite)"),
        ))),
        OverwriteBehavior::Prompt => {
            eprintln!("⚠️  File already exists: {file_path}");
            eprint!("Overwrite? [y/N]: ");
            std::io::stderr().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            match input.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(true),
                _ => Err(Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "Write cancelled by user",
                ))),
            }
        }
    }
}

/// Serialize `response` and write it to `destination`
pub async fn write_response(
    response: &RouteResponse,
    destination: &OutputDestination,
    overwrite: &OverwriteBehavior,
    pretty: bool,
) -> Result<()> {
    let mut body = if pretty {
        serde_json::to_vec_pretty(response)?
    } else {
        serde_json::to_vec(response)?
    };
    body.push(b'\n');

    match destination {
        OutputDestination::Stdout => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&body).await?;
            stdout.flush().await?;
        }
        OutputDestination::File(file_path) => {
            check_overwrite_permission(file_path, overwrite)?;
            tokio::fs::write(file_path, &body).await?;
            eprintln!("📁 Saved to: {file_path}");
        }
    }
    Ok(())
}
