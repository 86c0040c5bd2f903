//! # Butterfly-alt Library
//!
//! Enriches route responses from an OSRM-compatible routing backend with
//! synthetic alternative routes.
//!
//! ## How alternatives are made
//!
//! - **Detours**: every intersection along the primary route (up to a limit)
//!   is inspected for roads the route does not take; a via-point is placed a
//!   fixed distance down each of them
//! - **Concurrent lookups**: the backend is asked for `intersection → via-point →
//!   destination` for all via-points at once; failed lookups are dropped
//! - **Validation**: the first detour per intersection is kept unless it has a
//!   single leg or revisits a location
//! - **Congestion**: accepted detours get an illustrative congestion annotation
//!   on their detour leg
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use butterfly_alt::{DirectionsRequest, SynthesisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = DirectionsRequest::parse(
//!         "/directions/v5/mapbox/driving/4.3517,50.8503;4.4025,50.8798",
//!     )?;
//!     let config = SynthesisConfig::new("http://localhost:5000");
//!
//!     let response = butterfly_alt::get(&request, config).await?;
//!     println!("{} route(s)", response.routes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Custom backends
//!
//! Anything implementing [`RoutingBackend`] can drive a [`Synthesizer`]:
//!
//! ```rust,no_run
//! # use butterfly_alt::{Geopoint, OsrmBackend, RoutingBackend, SynthesisConfig, Synthesizer};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SynthesisConfig::new("http://localhost:5000");
//! let backend = OsrmBackend::new(&config)?;
//! let destination = Geopoint::new(4.4025, 50.8798);
//! let primary = backend
//!     .route(&[Geopoint::new(4.3517, 50.8503), destination])
//!     .await?
//!     .into_first_route()?;
//!
//! let mut synthesizer = Synthesizer::with_backend(backend, config).with_seed(42);
//! let result = synthesizer.synthesize(primary, destination).await;
//! println!("{} alternative(s)", result.alternatives.len());
//! # Ok(())
//! # }
//! ```

use log::info;

// Re-export core types that users might need
pub use crate::core::backend::{OsrmBackend, RoutingBackend};
pub use crate::core::config::SynthesisConfig;
pub use crate::core::congestion::annotate;
pub use crate::core::directions::{translate_path, translate_result, DirectionsRequest};
pub use crate::core::error::{Error, Result};
pub use crate::core::extract::{extract_intersections, has_cycle};
pub use crate::core::fetcher::{fetch_alternatives, AlternativeBatch, Candidate, FetchFailure};
pub use crate::core::geo::{project, Geopoint};
pub use crate::core::model::{
    Annotation, CongestionLevel, Intersection, Leg, Route, RouteResponse, Step,
};
pub use crate::core::synthesizer::{strip_alternative, ResultSet, Synthesizer, DETOUR_LEG};
pub use crate::core::via::generate_via_points;

// Internal modules
mod core;

/// Answer a directions request end to end
///
/// Fetches the primary route, synthesizes alternatives and returns the
/// backend response with all routes merged and a `uuid` added. The request's
/// profile overrides `config.profile`.
///
/// # Errors
/// A failed primary lookup is returned as is; missing alternatives are not
/// an error.
pub async fn get(request: &DirectionsRequest, config: SynthesisConfig) -> Result<RouteResponse> {
    let config = SynthesisConfig {
        profile: request.profile().to_string(),
        ..config
    };
    let synthesizer = Synthesizer::new(config)?;
    respond(synthesizer, request).await
}

/// Like [`get`], with a fixed seed for the congestion labels
pub async fn get_with_seed(
    request: &DirectionsRequest,
    config: SynthesisConfig,
    seed: u64,
) -> Result<RouteResponse> {
    let config = SynthesisConfig {
        profile: request.profile().to_string(),
        ..config
    };
    let synthesizer = Synthesizer::new(config)?.with_seed(seed);
    respond(synthesizer, request).await
}

async fn respond<B: RoutingBackend>(
    mut synthesizer: Synthesizer<B>,
    request: &DirectionsRequest,
) -> Result<RouteResponse> {
    let response = synthesizer.backend().route(request.waypoints()).await?;
    let primary = response.routes.first().cloned().ok_or_else(|| {
        Error::MalformedBackendResponse("primary lookup returned no routes".to_string())
    })?;
    info!(
        "Primary route {} → {} has {} leg(s)",
        request.origin(),
        request.destination(),
        primary.legs.len()
    );

    let result_set = synthesizer.synthesize(primary, request.destination()).await;
    Ok(translate_result(response, result_set))
}
