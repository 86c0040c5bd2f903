//! Directions-API boundary
//!
//! Translates between the directions dialect clients speak and the
//! `/route/v1` dialect of the routing backend.

use serde_json::Value;
use uuid::Uuid;

use crate::core::config::{coordinate_string, ROUTE_QUERY};
use crate::core::error::{Error, Result};
use crate::core::geo::Geopoint;
use crate::core::model::RouteResponse;
use crate::core::synthesizer::ResultSet;

/// A parsed directions request: profile plus at least two waypoints
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    profile: String,
    waypoints: Vec<Geopoint>,
}

impl DirectionsRequest {
    /// Parse a request path.
    ///
    /// Accepts `/directions/v5/{account}/{profile}/{coordinates}` and
    /// `/route/v1/{profile}/{coordinates}`. The query string is ignored.
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.split('?').next().unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["directions", "v5", _account, profile, coordinates] => {
                Self::from_coordinates(coordinates, backend_profile(profile))
            }
            ["route", "v1", profile, coordinates] => Self::from_coordinates(coordinates, profile),
            _ => Err(Error::InvalidInput(format!(
                "unsupported request path \"{path}\", expected /directions/v5/{{account}}/{{profile}}/{{coordinates}}"
            ))),
        }
    }

    /// Build a request from a `lon,lat;lon,lat[;...]` list
    pub fn from_coordinates(coordinates: &str, profile: &str) -> Result<Self> {
        let coordinates = coordinates.trim_end_matches(".json");
        let waypoints = coordinates
            .split(';')
            .map(str::parse)
            .collect::<Result<Vec<Geopoint>>>()?;
        if waypoints.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "a route needs at least 2 waypoints, got {} in \"{coordinates}\"",
                waypoints.len()
            )));
        }
        if profile.is_empty() {
            return Err(Error::InvalidInput("empty routing profile".to_string()));
        }

        Ok(Self {
            profile: profile.to_string(),
            waypoints,
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn waypoints(&self) -> &[Geopoint] {
        &self.waypoints
    }

    pub fn origin(&self) -> Geopoint {
        self.waypoints[0]
    }

    /// The final waypoint, where every alternative must end
    pub fn destination(&self) -> Geopoint {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Path and query to request from the routing backend
    pub fn backend_path(&self) -> String {
        format!(
            "/route/v1/{}/{}?{}",
            self.profile,
            coordinate_string(&self.waypoints),
            ROUTE_QUERY
        )
    }
}

/// Profiles of the directions dialect that the backend names differently
fn backend_profile(profile: &str) -> &str {
    match profile {
        "driving-traffic" => "driving",
        other => other,
    }
}

/// Rewrite a directions path into the backend path serving it
pub fn translate_path(path: &str) -> Result<String> {
    DirectionsRequest::parse(path).map(|request| request.backend_path())
}

/// Merge a result set into the primary backend response.
///
/// Every route the backend returned is kept; the primary stays first and the
/// alternatives follow the backend's own routes. A `uuid` is added, which
/// directions clients require.
pub fn translate_result(mut response: RouteResponse, result_set: ResultSet) -> RouteResponse {
    let ResultSet {
        primary,
        alternatives,
    } = result_set;
    match response.routes.first_mut() {
        Some(first) => *first = primary,
        None => response.routes.push(primary),
    }
    response.routes.extend(alternatives);
    response
        .extra
        .insert("uuid".to_string(), Value::String(Uuid::new_v4().to_string()));
    response
}
