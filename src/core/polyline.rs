//! Polyline6 geometry helpers
//!
//! The backend is always queried with `geometries=polyline6`, so every
//! geometry string in a response uses six digits of precision.

use geo::{Coord, LineString};

use crate::core::error::{Error, Result};
use crate::core::model::{Leg, Step};

/// Precision of the `polyline6` encoding requested from the backend
pub const POLYLINE6_PRECISION: u32 = 6;

/// Decodes a polyline6 string into its coordinates (x = lon, y = lat)
pub fn decode(encoded: &str) -> Result<Vec<Coord<f64>>> {
    let line: LineString<f64> = ::polyline::decode_polyline(encoded, POLYLINE6_PRECISION)
        .map_err(|msg| Error::MalformedBackendResponse(format!("undecodable geometry: {msg}")))?;
    Ok(line.0)
}

/// Encodes coordinates back into a polyline6 string
pub fn encode(coords: Vec<Coord<f64>>) -> Result<String> {
    ::polyline::encode_coordinates(coords, POLYLINE6_PRECISION)
        .map_err(|msg| Error::InvalidGeometryInput(format!("unencodable geometry: {msg}")))
}

/// Decodes and concatenates step geometries in order.
///
/// Consecutive steps share their join point; the duplicate is dropped so the
/// result has one coordinate per distinct vertex of the path.
pub fn concat_steps<'a>(steps: impl IntoIterator<Item = &'a Step>) -> Result<Vec<Coord<f64>>> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for step in steps {
        let decoded = decode(&step.geometry)?;
        let skip = match (coords.last(), decoded.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        coords.extend(decoded.into_iter().skip(skip));
    }
    Ok(coords)
}

/// Decoded geometry of a leg: its own geometry when the backend sent one,
/// otherwise the stitched geometry of its steps
pub fn leg_coordinates(leg: &Leg) -> Result<Vec<Coord<f64>>> {
    match leg.geometry.as_deref() {
        Some(encoded) => decode(encoded),
        None => concat_steps(&leg.steps),
    }
}
