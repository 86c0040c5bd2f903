//! CLI-specific utilities for butterfly-alt
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod output;

pub use output::{write_response, OutputDestination, OverwriteBehavior};
