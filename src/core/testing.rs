//! Route fixtures and a scripted backend shared by the unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use geo::coord;
use serde_json::{json, Map, Value};

use crate::core::backend::RoutingBackend;
use crate::core::error::Result;
use crate::core::geo::Geopoint;
use crate::core::model::{Intersection, Leg, Route, RouteResponse, Step};
use crate::core::polyline;

/// Step whose geometry runs through `points` and has an intersection at each
pub fn step_through(points: &[(f64, f64)]) -> Step {
    let coords = points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect();
    Step {
        geometry: polyline::encode(coords).unwrap(),
        intersections: points
            .iter()
            .map(|&(lon, lat)| Intersection::new(Geopoint::new(lon, lat), vec![0.0, 180.0]).with_in(1).with_out(0))
            .collect(),
        extra: Map::new(),
    }
}

/// Route with one single-step leg per entry of `legs`
pub fn route_through(legs: &[&[(f64, f64)]]) -> Route {
    let legs: Vec<Leg> = legs
        .iter()
        .map(|points| Leg {
            steps: vec![step_through(points)],
            geometry: None,
            annotation: None,
            extra: Map::new(),
        })
        .collect();
    let geometry = polyline::encode(
        polyline::concat_steps(legs.iter().flat_map(|leg| leg.steps.iter())).unwrap(),
    )
    .unwrap();
    Route {
        geometry,
        legs,
        extra: Map::new(),
    }
}

/// Primary route whose intersections each leave exactly one side road (east)
pub fn primary_with_side_roads(points: &[(f64, f64)]) -> Route {
    let mut route = route_through(&[points]);
    for intersection in route.legs[0].steps[0].intersections.iter_mut() {
        *intersection = Intersection::new(intersection.location, vec![0.0, 90.0, 180.0])
            .with_in(2)
            .with_out(0);
    }
    route
}

/// A valid acyclic two-leg detour starting at `start` and passing `via`.
///
/// The second leg does not repeat the via-point, so no location occurs twice.
pub fn detour_route(start: Geopoint, via: Geopoint) -> Route {
    let (sx, sy) = (start.lon(), start.lat());
    let (vx, vy) = (via.lon(), via.lat());
    route_through(&[
        &[(sx, sy), (vx, vy)],
        &[(vx + 0.001, vy + 0.001), (vx + 0.01, vy + 0.01)],
    ])
}

pub fn ok_response(route: Route) -> RouteResponse {
    RouteResponse {
        code: Some("Ok".to_string()),
        routes: vec![route],
        extra: Map::new(),
    }
}

pub fn response_json(route: &Route) -> Value {
    json!({
        "code": "Ok",
        "routes": [route],
        "waypoints": [],
    })
}

type Script = dyn Fn(&[Geopoint]) -> Result<RouteResponse> + Send + Sync;
type Delay = dyn Fn(&[Geopoint]) -> Duration + Send + Sync;

/// Backend answering every lookup from a closure and recording the waypoints
pub struct ScriptedBackend {
    script: Box<Script>,
    delay: Option<Box<Delay>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<Geopoint>>>,
    completed: Mutex<Vec<Vec<Geopoint>>>,
}

impl ScriptedBackend {
    pub fn new(script: impl Fn(&[Geopoint]) -> Result<RouteResponse> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Hold each answer back for `delay(waypoints)` before replying
    pub fn with_delay(mut self, delay: impl Fn(&[Geopoint]) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Waypoints of finished lookups, in completion order
    pub fn completed(&self) -> Vec<Vec<Geopoint>> {
        self.completed.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<Geopoint>> {
        self.requests.lock().unwrap().clone()
    }
}

impl RoutingBackend for ScriptedBackend {
    async fn route(&self, waypoints: &[Geopoint]) -> Result<RouteResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(waypoints.to_vec());
        match &self.delay {
            Some(delay) => tokio::time::sleep(delay(waypoints)).await,
            None => tokio::task::yield_now().await,
        }
        let answer = (self.script)(waypoints);
        self.completed.lock().unwrap().push(waypoints.to_vec());
        answer
    }
}
