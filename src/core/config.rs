//! Synthesis configuration and backend URL resolution

use std::time::Duration;

use crate::core::geo::Geopoint;

/// Query options every backend lookup is made with
pub const ROUTE_QUERY: &str = "steps=true&geometries=polyline6";

/// Configuration for one synthesizer.
///
/// Built explicitly by the caller; nothing here is read from process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    /// Base URL of the OSRM-compatible backend, without trailing slash
    pub base_url: String,

    /// Routing profile segment of the backend path
    pub profile: String,

    /// Distance in meters between an intersection and its detour via-points
    pub detour_distance: f64,

    /// Maximum number of intersections along the primary route to detour from
    pub max_intersections: usize,

    /// Replace an accepted alternative's geometry with its first two steps
    pub strip_alternative: bool,

    /// Upper bound for a single backend lookup
    pub request_timeout: Duration,
}

impl SynthesisConfig {
    /// Configuration for `base_url` with the standard detour policy:
    /// driving profile, 100 m detours, 10 intersections, no stripping,
    /// 10 s per lookup.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            profile: "driving".to_string(),
            detour_distance: 100.0,
            max_intersections: 10,
            strip_alternative: false,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Full backend URL for a route through `waypoints`
    pub fn route_url(&self, waypoints: &[Geopoint]) -> String {
        format!(
            "{}/route/v1/{}/{}?{}",
            self.base_url,
            self.profile,
            coordinate_string(waypoints),
            ROUTE_QUERY
        )
    }
}

/// `lon,lat` pairs joined by `;`, the backend's coordinate list format
pub fn coordinate_string(waypoints: &[Geopoint]) -> String {
    waypoints
        .iter()
        .map(Geopoint::to_string)
        .collect::<Vec<_>>()
        .join(";")
}
