//! Alternative route synthesis
//!
//! Drives the whole pipeline for one primary route: extract intersections,
//! fetch detours for all of them concurrently, keep the first usable detour
//! per intersection and annotate it.

use futures::future::join_all;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::backend::{OsrmBackend, RoutingBackend};
use crate::core::config::SynthesisConfig;
use crate::core::congestion::annotate;
use crate::core::error::Result;
use crate::core::extract::{extract_intersections, has_cycle};
use crate::core::fetcher::{fetch_alternatives, AlternativeBatch};
use crate::core::geo::Geopoint;
use crate::core::model::Route;
use crate::core::polyline;

/// Leg of an alternative that leads from the intersection to the via-point
pub const DETOUR_LEG: usize = 1;

/// The primary route plus the accepted alternatives, in intersection order
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub primary: Route,
    pub alternatives: Vec<Route>,
}

impl ResultSet {
    /// Primary first, then the alternatives
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        std::iter::once(&self.primary).chain(self.alternatives.iter())
    }

    pub fn into_routes(self) -> Vec<Route> {
        let mut routes = Vec::with_capacity(1 + self.alternatives.len());
        routes.push(self.primary);
        routes.extend(self.alternatives);
        routes
    }
}

/// Synthesizes alternatives against a routing backend
pub struct Synthesizer<B, R = StdRng> {
    backend: B,
    config: SynthesisConfig,
    rng: R,
}

impl Synthesizer<OsrmBackend> {
    /// Synthesizer talking HTTP to `config.base_url`
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let backend = OsrmBackend::new(&config)?;
        Ok(Self::with_backend(backend, config))
    }
}

impl<B: RoutingBackend> Synthesizer<B> {
    /// Synthesizer over any backend, with an OS-seeded random source
    pub fn with_backend(backend: B, config: SynthesisConfig) -> Self {
        Self {
            backend,
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reseed the congestion random source for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl<B: RoutingBackend, R: Rng> Synthesizer<B, R> {
    /// Swap in another random source
    pub fn with_rng<S: Rng>(self, rng: S) -> Synthesizer<B, S> {
        Synthesizer {
            backend: self.backend,
            config: self.config,
            rng,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Build the result set for `primary`, a route ending at `destination`.
    ///
    /// Never fails: an intersection whose lookups fail or whose detour is
    /// rejected simply contributes nothing.
    pub async fn synthesize(&mut self, primary: Route, destination: Geopoint) -> ResultSet {
        let intersections = extract_intersections(&primary, Some(self.config.max_intersections));
        info!(
            "Synthesizing alternatives from {} intersection(s) towards {destination}",
            intersections.len()
        );

        let backend = &self.backend;
        let config = &self.config;
        let batches = join_all(
            intersections
                .iter()
                .map(|intersection| fetch_alternatives(backend, intersection, destination, config)),
        )
        .await;

        let mut alternatives = Vec::new();
        for (position, (intersection, batch)) in intersections.iter().zip(batches).enumerate() {
            let location = intersection.location;
            match batch.and_then(|batch| self.accept(batch)) {
                Ok(Some(route)) => {
                    debug!("Intersection #{position} at {location}: alternative accepted");
                    alternatives.push(route);
                }
                Ok(None) => {}
                Err(e) => warn!("Intersection #{position} at {location} skipped: {e}"),
            }
        }

        info!(
            "Accepted {} alternative(s) out of {} intersection(s)",
            alternatives.len(),
            intersections.len()
        );
        ResultSet {
            primary,
            alternatives,
        }
    }

    /// Validate, stitch and annotate the first candidate of a batch
    fn accept(&mut self, batch: AlternativeBatch) -> Result<Option<Route>> {
        let Some(candidate) = batch.into_first() else {
            return Ok(None);
        };
        let route = candidate.route;

        if route.legs.len() < 2 {
            debug!(
                "Detour via {} rejected: {} leg(s), expected at least 2",
                candidate.via_point,
                route.legs.len()
            );
            return Ok(None);
        }
        if has_cycle(&route) {
            debug!("Detour via {} rejected: route revisits a location", candidate.via_point);
            return Ok(None);
        }

        let route = if self.config.strip_alternative {
            strip_alternative(route)?
        } else {
            route
        };

        annotate(route, DETOUR_LEG, &mut self.rng).map(Some)
    }
}

/// Replace the route geometry with the decoded geometries of its first two
/// steps, concatenated as they are.
///
/// The shared join point is kept twice. Routes with fewer than two steps are
/// returned unchanged.
pub fn strip_alternative(mut route: Route) -> Result<Route> {
    let steps: Vec<_> = route.steps().take(2).collect();
    let [first, second] = steps.as_slice() else {
        debug!("Route has {} step(s), leaving geometry as is", steps.len());
        return Ok(route);
    };

    let mut coords = polyline::decode(&first.geometry)?;
    coords.extend(polyline::decode(&second.geometry)?);
    route.geometry = polyline::encode(coords)?;
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::model::{Intersection, RouteResponse};
    use std::time::Duration;
    use crate::core::testing::{
        detour_route, ok_response, primary_with_side_roads, route_through, step_through,
        ScriptedBackend,
    };

    const PRIMARY: [(f64, f64); 3] = [(4.35, 50.85), (4.36, 50.85), (4.37, 50.85)];

    fn destination() -> Geopoint {
        Geopoint::new(4.40, 50.85)
    }

    fn synthesizer(backend: ScriptedBackend) -> Synthesizer<ScriptedBackend> {
        Synthesizer::with_backend(backend, SynthesisConfig::new("http://osrm.test")).with_seed(11)
    }

    fn detours(waypoints: &[Geopoint]) -> Result<RouteResponse> {
        Ok(ok_response(detour_route(waypoints[0], waypoints[1])))
    }

    #[tokio::test]
    async fn test_every_intersection_contributes() {
        let mut synthesizer = synthesizer(ScriptedBackend::new(detours));

        let result = synthesizer
            .synthesize(primary_with_side_roads(&PRIMARY), destination())
            .await;

        assert_eq!(synthesizer.backend().calls(), 3);
        assert_eq!(result.alternatives.len(), 3);
        assert_eq!(result.routes().count(), 4);
        for (alternative, &(lon, lat)) in result.alternatives.iter().zip(&PRIMARY) {
            let start = alternative.legs[0].steps[0].intersections[0].location;
            assert_eq!(start, Geopoint::new(lon, lat), "alternatives keep intersection order");
            assert!(alternative.legs[0].annotation.is_none());
            let congestion = &alternative.legs[DETOUR_LEG].annotation.as_ref().unwrap().congestion;
            assert_eq!(congestion.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_failing_intersection_contributes_nothing() {
        let (failing_lon, _) = PRIMARY[1];
        let backend = ScriptedBackend::new(move |waypoints| {
            if waypoints[0].lon() == failing_lon {
                Err(Error::BackendRequestFailed("HTTP 500".to_string()))
            } else {
                detours(waypoints)
            }
        });
        let mut synthesizer = synthesizer(backend);

        let result = synthesizer
            .synthesize(primary_with_side_roads(&PRIMARY), destination())
            .await;

        assert_eq!(result.alternatives.len(), 2);
        let starts: Vec<f64> = result
            .alternatives
            .iter()
            .map(|route| route.legs[0].steps[0].intersections[0].location.lon())
            .collect();
        assert_eq!(starts, vec![PRIMARY[0].0, PRIMARY[2].0]);
    }

    #[tokio::test]
    async fn test_cyclic_candidate_rejected() {
        let looping_lon = PRIMARY[0].0;
        let backend = ScriptedBackend::new(move |waypoints| {
            if waypoints[0].lon() == looping_lon {
                let (sx, sy) = (waypoints[0].lon(), waypoints[0].lat());
                let (vx, vy) = (waypoints[1].lon(), waypoints[1].lat());
                Ok(ok_response(route_through(&[&[(sx, sy), (vx, vy)], &[(vx, vy), (sx, sy)]])))
            } else {
                detours(waypoints)
            }
        });
        let mut synthesizer = synthesizer(backend);

        let result = synthesizer
            .synthesize(primary_with_side_roads(&PRIMARY), destination())
            .await;

        assert_eq!(result.alternatives.len(), 2);
    }

    #[tokio::test]
    async fn test_single_leg_candidate_rejected() {
        let backend = ScriptedBackend::new(|waypoints| {
            let (sx, sy) = (waypoints[0].lon(), waypoints[0].lat());
            Ok(ok_response(route_through(&[&[(sx, sy), (sx + 0.01, sy)]])))
        });
        let mut synthesizer = synthesizer(backend);

        let result = synthesizer
            .synthesize(primary_with_side_roads(&PRIMARY), destination())
            .await;

        assert!(result.alternatives.is_empty());
        assert_eq!(result.routes().count(), 1);
    }

    #[tokio::test]
    async fn test_first_candidate_wins_even_if_rejected() {
        // Four-way intersection: two unused roads, the first detour loops back
        let mut primary = route_through(&[&[(4.35, 50.85)]]);
        primary.legs[0].steps[0].intersections[0].bearings = vec![0.0, 90.0, 180.0, 270.0];
        primary.legs[0].steps[0].intersections[0].in_index = Some(2);
        primary.legs[0].steps[0].intersections[0].out_index = Some(0);
        let east = crate::core::geo::project(Geopoint::new(4.35, 50.85), 100.0, 90.0).unwrap();

        let backend = ScriptedBackend::new(move |waypoints| {
            let (sx, sy) = (waypoints[0].lon(), waypoints[0].lat());
            let (vx, vy) = (waypoints[1].lon(), waypoints[1].lat());
            if waypoints[1] == east {
                Ok(ok_response(route_through(&[&[(sx, sy), (vx, vy)], &[(vx, vy), (sx, sy)]])))
            } else {
                detours(waypoints)
            }
        });
        let mut synthesizer = synthesizer(backend);

        let result = synthesizer.synthesize(primary, destination()).await;

        assert_eq!(synthesizer.backend().calls(), 2);
        assert!(result.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_lowest_via_index_wins_regardless_of_completion_order() {
        let origin = Geopoint::new(4.35, 50.85);
        let mut primary = route_through(&[&[(4.35, 50.85)]]);
        primary.legs[0].steps[0].intersections[0] =
            Intersection::new(origin, vec![0.0, 90.0, 180.0, 270.0]).with_in(2).with_out(0);
        let east = crate::core::geo::project(origin, 100.0, 90.0).unwrap();
        let west = crate::core::geo::project(origin, 100.0, 270.0).unwrap();

        let backend = ScriptedBackend::new(detours).with_delay(move |waypoints| {
            if waypoints[1] == east {
                Duration::from_millis(40)
            } else {
                Duration::ZERO
            }
        });
        let mut synthesizer = synthesizer(backend);

        let result = synthesizer.synthesize(primary, destination()).await;

        let completed = synthesizer.backend().completed();
        assert_eq!(completed[0][1], west);
        assert_eq!(completed[1][1], east);

        assert_eq!(result.alternatives.len(), 1);
        let via = result.alternatives[0].legs[0].steps[0].intersections[1].location;
        assert_eq!(via, east);
    }

    #[tokio::test]
    async fn test_intersection_limit() {
        let config = SynthesisConfig {
            max_intersections: 2,
            ..SynthesisConfig::new("http://osrm.test")
        };
        let mut synthesizer = Synthesizer::with_backend(ScriptedBackend::new(detours), config);

        let result = synthesizer
            .synthesize(primary_with_side_roads(&PRIMARY), destination())
            .await;

        assert_eq!(synthesizer.backend().calls(), 2);
        assert_eq!(result.alternatives.len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_synthesis_is_reproducible() {
        let mut first = synthesizer(ScriptedBackend::new(detours));
        let mut second = synthesizer(ScriptedBackend::new(detours));

        let a = first.synthesize(primary_with_side_roads(&PRIMARY), destination()).await;
        let b = second.synthesize(primary_with_side_roads(&PRIMARY), destination()).await;

        let labels = |set: &ResultSet| -> Vec<_> {
            set.alternatives
                .iter()
                .map(|route| route.legs[DETOUR_LEG].annotation.as_ref().unwrap().congestion.clone())
                .collect()
        };
        assert_eq!(labels(&a), labels(&b));
    }

    #[tokio::test]
    async fn test_strip_policy_rewrites_geometry() {
        let config = SynthesisConfig {
            strip_alternative: true,
            ..SynthesisConfig::new("http://osrm.test")
        };
        let mut synthesizer = Synthesizer::with_backend(ScriptedBackend::new(detours), config).with_seed(2);

        let result = synthesizer
            .synthesize(primary_with_side_roads(&PRIMARY[..1]), destination())
            .await;

        let alternative = &result.alternatives[0];
        let steps: Vec<_> = alternative.steps().take(2).collect();
        let mut expected = polyline::decode(&steps[0].geometry).unwrap();
        expected.extend(polyline::decode(&steps[1].geometry).unwrap());
        assert_eq!(polyline::decode(&alternative.geometry).unwrap(), expected);
    }

    #[test]
    fn test_strip_uses_exactly_two_steps() {
        let mut route = route_through(&[&[(4.0, 50.0), (4.001, 50.0)]]);
        route.legs[0].steps.push(step_through(&[(4.001, 50.0), (4.002, 50.0)]));
        route.legs[0].steps.push(step_through(&[(4.002, 50.0), (4.003, 50.0)]));

        let stripped = strip_alternative(route).unwrap();
        let coords = polyline::decode(&stripped.geometry).unwrap();
        // 2 + 2 points, the join point (4.001, 50.0) appears twice
        assert_eq!(coords.len(), 4);
        assert_eq!(coords[1], coords[2]);
        assert!((coords[3].x - 4.002).abs() < 1e-9);
    }

    #[test]
    fn test_strip_keeps_short_routes() {
        let route = route_through(&[&[(4.0, 50.0), (4.001, 50.0)]]);
        let geometry = route.geometry.clone();
        assert_eq!(strip_alternative(route).unwrap().geometry, geometry);
    }

    #[test]
    fn test_result_set_order() {
        let primary = route_through(&[&[(1.0, 1.0)]]);
        let alternative = route_through(&[&[(2.0, 2.0)], &[(3.0, 3.0)]]);
        let set = ResultSet {
            primary,
            alternatives: vec![alternative],
        };
        let routes = set.into_routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].legs.len(), 1);
        assert_eq!(routes[1].legs.len(), 2);
    }
}
