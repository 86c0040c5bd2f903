//! Concurrent detour lookups for a single intersection

use futures::future::join_all;
use log::debug;

use crate::core::backend::RoutingBackend;
use crate::core::config::SynthesisConfig;
use crate::core::error::{Error, Result};
use crate::core::geo::Geopoint;
use crate::core::model::{Intersection, Route, RouteResponse};
use crate::core::via::generate_via_points;

/// A detour route the backend produced for one via-point
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position of the via-point among the intersection's via-points
    pub via_index: usize,
    pub via_point: Geopoint,
    pub route: Route,
}

/// A via-point whose lookup failed
#[derive(Debug)]
pub struct FetchFailure {
    pub via_index: usize,
    pub via_point: Geopoint,
    pub error: Error,
}

/// Outcome of all lookups for one intersection, both lists in via-point order
#[derive(Debug, Default)]
pub struct AlternativeBatch {
    pub candidates: Vec<Candidate>,
    pub failures: Vec<FetchFailure>,
}

impl AlternativeBatch {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The candidate with the lowest via-point index.
    ///
    /// Positional, not cost-based: the first side road that produced a route wins.
    pub fn into_first(self) -> Option<Candidate> {
        self.candidates.into_iter().min_by_key(|candidate| candidate.via_index)
    }
}

/// Look up `intersection → via-point → destination` for every via-point of
/// `intersection`, all at once.
///
/// Resolves when every lookup has finished. A lookup the backend failed or
/// answered unusably lands in `failures` and never affects its siblings.
/// Invalid intersection geometry, or any other kind of error from a lookup,
/// fails the whole call.
pub async fn fetch_alternatives<B: RoutingBackend>(
    backend: &B,
    intersection: &Intersection,
    destination: Geopoint,
    config: &SynthesisConfig,
) -> Result<AlternativeBatch> {
    let start = intersection.location;
    let via_points = generate_via_points(intersection, config.detour_distance)?;
    if via_points.is_empty() {
        debug!("No unused roads at {start}, nothing to fetch");
        return Ok(AlternativeBatch::default());
    }

    let lookups = via_points.iter().map(|&via_point| async move {
        let waypoints = [start, via_point, destination];
        backend
            .route(&waypoints)
            .await
            .and_then(RouteResponse::into_first_route)
    });
    let results = join_all(lookups).await;

    let mut batch = AlternativeBatch::default();
    for (via_index, (via_point, result)) in via_points.into_iter().zip(results).enumerate() {
        match result {
            Ok(route) => batch.candidates.push(Candidate {
                via_index,
                via_point,
                route,
            }),
            Err(error) if !error.is_backend_failure() => return Err(error),
            Err(error) => {
                debug!("Detour via {via_point} from {start} dropped: {error}");
                batch.failures.push(FetchFailure {
                    via_index,
                    via_point,
                    error,
                });
            }
        }
    }

    debug!(
        "Intersection {start}: {} candidate(s), {} failed lookup(s)",
        batch.candidates.len(),
        batch.failures.len()
    );
    Ok(batch)
}
