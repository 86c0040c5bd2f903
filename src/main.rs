//! # Butterfly-alt CLI
//!
//! Command-line interface for the butterfly-alt library.
//! Answers one directions request against an OSRM backend and prints the
//! response enriched with synthetic alternatives.

use std::time::Duration;

use butterfly_alt::{translate_path, DirectionsRequest, Error, Result, SynthesisConfig};
use clap::Parser;
use log::{error, info};

use crate::cli::{write_response, OutputDestination, OverwriteBehavior};

mod cli;

/// Command-line interface for butterfly-alt
#[derive(Parser)]
#[command(name = "butterfly-alt")]
#[command(about = "Synthetic alternative routes for OSRM-compatible routing backends")]
#[command(long_about = "Fetches a primary route and detours through its side streets:
  butterfly-alt '4.3517,50.8503;4.4025,50.8798'              # Print to stdout
  butterfly-alt '/directions/v5/mapbox/driving/4.35,50.85;4.40,50.88' routes.json
  butterfly-alt --dry-run '/directions/v5/mapbox/driving/4.35,50.85;4.40,50.88'

File Overwrite Behavior:
  By default, you'll be prompted if destination file exists
  --force                          # Overwrite without asking
  --no-clobber                     # Never overwrite, fail if file exists")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    /// Directions path ("/directions/v5/...") or "lon,lat;lon,lat" waypoint list
    request: String,

    /// Output file path, or "-" for stdout
    #[arg(default_value = "-")]
    output: String,

    /// Base URL of the OSRM-compatible backend
    #[arg(long, default_value = "http://localhost:5000")]
    backend: String,

    /// Routing profile, used when the request is a plain waypoint list
    #[arg(long, default_value = "driving")]
    profile: String,

    /// Distance in meters from an intersection to its detour via-points
    #[arg(long, default_value_t = 100.0)]
    detour_distance: f64,

    /// Maximum number of intersections to detour from
    #[arg(long, default_value_t = 10)]
    max_intersections: usize,

    /// Reduce each alternative's geometry to its first two steps
    #[arg(long)]
    strip_alternative: bool,

    /// Timeout for a single backend lookup, in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Seed for the congestion labels (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the JSON response
    #[arg(long)]
    pretty: bool,

    /// Enable dry-run mode (show the backend request without sending it)
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Force overwrite existing files without prompting
    #[arg(short, long)]
    force: bool,

    /// Never overwrite existing files (fail if destination exists)
    #[arg(long)]
    no_clobber: bool,
}

impl Cli {
    fn directions_request(&self) -> Result<DirectionsRequest> {
        if self.request.starts_with('/') {
            DirectionsRequest::parse(&self.request)
        } else {
            DirectionsRequest::from_coordinates(&self.request, &self.profile)
        }
    }

    fn synthesis_config(&self) -> Result<SynthesisConfig> {
        if !self.detour_distance.is_finite() || self.detour_distance < 0.0 {
            return Err(Error::InvalidInput(format!(
                "--detour-distance must be a non-negative number of meters, got {}",
                self.detour_distance
            )));
        }
        if self.timeout == 0 {
            return Err(Error::InvalidInput("--timeout must be at least 1 second".to_string()));
        }

        Ok(SynthesisConfig {
            profile: self.profile.clone(),
            detour_distance: self.detour_distance,
            max_intersections: self.max_intersections,
            strip_alternative: self.strip_alternative,
            request_timeout: Duration::from_secs(self.timeout),
            ..SynthesisConfig::new(self.backend.as_str())
        })
    }

    fn overwrite_behavior(&self) -> OverwriteBehavior {
        if self.force {
            OverwriteBehavior::Force
        } else if self.no_clobber {
            OverwriteBehavior::NeverOverwrite
        } else {
            OverwriteBehavior::Prompt
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_default_env();
    logger.target(env_logger::Target::Stderr);
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if cli.verbose {
        eprintln!("🦋 Butterfly-alt v{} starting...", env!("BUTTERFLY_VERSION"));
    }

    // Validate conflicting flags
    if cli.force && cli.no_clobber {
        return Err(Error::InvalidInput(
            "--force and --no-clobber cannot be used together".to_string(),
        ));
    }

    let request = cli.directions_request()?;
    let config = cli.synthesis_config()?;
    let output = OutputDestination::resolve(&cli.output);

    if cli.dry_run {
        let backend_path = if cli.request.starts_with('/') {
            translate_path(&cli.request)?
        } else {
            request.backend_path()
        };
        eprintln!(
            "🔍 [DRY RUN] Would request: {}{backend_path} and write to {output:?}",
            config.base_url
        );
        return Ok(());
    }

    info!("🌐 Routing backend: {}", config.base_url);

    let response = match cli.seed {
        Some(seed) => butterfly_alt::get_with_seed(&request, config, seed).await?,
        None => butterfly_alt::get(&request, config).await?,
    };

    if cli.verbose {
        eprintln!(
            "✅ {} route(s): 1 primary + {} alternative(s)",
            response.routes.len(),
            response.routes.len().saturating_sub(1)
        );
    }

    write_response(&response, &output, &cli.overwrite_behavior(), cli.pretty).await
}
