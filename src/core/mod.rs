//! Core library modules for butterfly-alt
//!
//! This module contains the synthesis engine and the backend boundary.

pub mod backend;
pub mod config;
pub mod congestion;
pub mod directions;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod geo;
pub mod model;
pub mod polyline;
pub mod synthesizer;
pub mod via;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for internal use
pub use config::SynthesisConfig;
pub use synthesizer::{ResultSet, Synthesizer};
