//! Intersection walks over a route
//!
//! Both the extractor and the cycle detector walk legs, then steps, then
//! intersections, in document order.

use std::collections::HashSet;

use crate::core::model::{Intersection, Route};

/// Intersections of `route` in travel order, at most `limit` of them.
///
/// `None` walks the whole route. Legs and steps without entries are skipped.
pub fn extract_intersections(route: &Route, limit: Option<usize>) -> Vec<Intersection> {
    let walk = route.intersections().cloned();
    match limit {
        Some(limit) => walk.take(limit).collect(),
        None => walk.collect(),
    }
}

/// True when the route passes through the same exact location twice
pub fn has_cycle(route: &Route) -> bool {
    let mut seen = HashSet::new();
    route
        .intersections()
        .any(|intersection| !seen.insert(intersection.location.key()))
}
