//! Detour via-point generation

use crate::core::error::Result;
use crate::core::geo::{project, Geopoint};
use crate::core::model::Intersection;

/// Bearings of the roads the primary route does not use at this intersection.
///
/// The inbound and outbound bearings are removed by position, so a side road
/// that happens to share a bearing value with the route is still offered.
pub fn unused_bearings(intersection: &Intersection) -> Vec<f64> {
    intersection
        .bearings
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            Some(*index) != intersection.in_index && Some(*index) != intersection.out_index
        })
        .map(|(_, &bearing)| bearing)
        .collect()
}

/// One detour point per unused bearing, `detour_distance` meters out.
///
/// A dead end yields an empty list.
pub fn generate_via_points(
    intersection: &Intersection,
    detour_distance: f64,
) -> Result<Vec<Geopoint>> {
    unused_bearings(intersection)
        .into_iter()
        .map(|bearing| project(intersection.location, detour_distance, bearing))
        .collect()
}
