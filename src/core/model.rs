//! Wire model of an OSRM route response
//!
//! Only the fields the synthesis engine reads are typed. Everything else is
//! carried through `extra` so a merged response still looks like the backend's
//! own answer to the client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{Error, Result};
use crate::core::geo::Geopoint;

/// Top-level body returned by `/route/v1/...`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteResponse {
    /// Checks the backend status code and every route's structural invariants
    pub fn validate(&self) -> Result<()> {
        if let Some(code) = self.code.as_deref() {
            if code != "Ok" {
                let message = self
                    .extra
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                return Err(Error::MalformedBackendResponse(format!(
                    "backend answered with code {code}: {message}"
                )));
            }
        }
        self.routes.iter().try_for_each(Route::validate)
    }

    /// Takes the first route, the one the backend ranks best
    pub fn into_first_route(self) -> Result<Route> {
        self.routes.into_iter().next().ok_or_else(|| {
            Error::MalformedBackendResponse("response contains no routes".to_string())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub geometry: String,

    #[serde(default)]
    pub legs: Vec<Leg>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    /// Every intersection of the route in travel order
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.steps().flat_map(|step| step.intersections.iter())
    }

    /// Every step of the route in travel order
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.legs.iter().flat_map(|leg| leg.steps.iter())
    }

    pub fn validate(&self) -> Result<()> {
        self.intersections().try_for_each(Intersection::validate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Only present when the backend was asked for per-leg geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub geometry: String,

    #[serde(default)]
    pub intersections: Vec<Intersection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intersection {
    pub location: Geopoint,

    #[serde(default)]
    pub bearings: Vec<f64>,

    /// Index into `bearings` of the direction the route arrives from
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub in_index: Option<usize>,

    /// Index into `bearings` of the direction the route leaves by
    #[serde(rename = "out", default, skip_serializing_if = "Option::is_none")]
    pub out_index: Option<usize>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Intersection {
    pub fn new(location: Geopoint, bearings: Vec<f64>) -> Self {
        Self {
            location,
            bearings,
            in_index: None,
            out_index: None,
            extra: Map::new(),
        }
    }

    pub fn with_in(mut self, index: usize) -> Self {
        self.in_index = Some(index);
        self
    }

    pub fn with_out(mut self, index: usize) -> Self {
        self.out_index = Some(index);
        self
    }

    /// `in` and `out` must point inside `bearings`
    pub fn validate(&self) -> Result<()> {
        for (name, index) in [("in", self.in_index), ("out", self.out_index)] {
            if let Some(index) = index {
                if index >= self.bearings.len() {
                    return Err(Error::MalformedBackendResponse(format!(
                        "intersection at {} has {name} index {index} but only {} bearing(s)",
                        self.location,
                        self.bearings.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Per-leg annotation block, as the directions API lays it out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub congestion: Vec<CongestionLevel>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Traffic level of one geometry segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Moderate,
    Heavy,
}
