//! Synthetic congestion annotation
//!
//! Labels are illustrative only. One label is drawn per annotated leg and
//! applied to all of its segments.

use rand::Rng;

use crate::core::error::{Error, Result};
use crate::core::model::{Annotation, CongestionLevel, Route};
use crate::core::polyline;

/// Labels a detour leg may be painted with
pub const SYNTHETIC_LEVELS: [CongestionLevel; 2] = [CongestionLevel::Heavy, CongestionLevel::Moderate];

/// Attach a congestion annotation to leg `leg_index` of `route`.
///
/// The annotation has one label per segment of the leg's decoded geometry.
pub fn annotate<R: Rng>(mut route: Route, leg_index: usize, rng: &mut R) -> Result<Route> {
    let legs = route.legs.len();
    let leg = route.legs.get_mut(leg_index).ok_or(Error::InvalidLegIndex {
        index: leg_index,
        legs,
    })?;

    let segments = polyline::leg_coordinates(leg)?.len().saturating_sub(1);
    let level = SYNTHETIC_LEVELS[rng.random_range(0..SYNTHETIC_LEVELS.len())];

    leg.annotation.get_or_insert_with(Annotation::default).congestion = vec![level; segments];
    Ok(route)
}
