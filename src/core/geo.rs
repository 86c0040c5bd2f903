//! Geodesic primitives for butterfly-alt
//!
//! A [`Geopoint`] is the canonical coordinate shape used everywhere in the
//! crate. Whatever alias arrives on the wire is normalized at ingestion.

use std::fmt;
use std::str::FromStr;

use geo::{Destination, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// A WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeopointRepr", into = "[f64; 2]")]
pub struct Geopoint {
    lon: f64,
    lat: f64,
}

impl Geopoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Exact identity key used for revisit detection.
    ///
    /// No tolerance is applied; only `-0.0` is folded onto `0.0` so that both
    /// zeros print and compare the same way.
    pub fn key(&self) -> (u64, u64) {
        ((self.lon + 0.0).to_bits(), (self.lat + 0.0).to_bits())
    }

    fn validate(&self) -> Result<()> {
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::InvalidGeometryInput(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidGeometryInput(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Geopoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

impl FromStr for Geopoint {
    type Err = Error;

    /// Parses the combined `"lon,lat"` form
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',');
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidInput(format!(
                "expected \"lon,lat\", got \"{s}\""
            )));
        };
        let parse = |value: &str| {
            value.trim().parse::<f64>().map_err(|e| {
                Error::InvalidInput(format!("invalid coordinate \"{value}\" in \"{s}\": {e}"))
            })
        };
        Ok(Geopoint::new(parse(lon)?, parse(lat)?))
    }
}

impl From<Geopoint> for [f64; 2] {
    fn from(point: Geopoint) -> Self {
        [point.lon, point.lat]
    }
}

impl From<Geopoint> for Point<f64> {
    fn from(point: Geopoint) -> Self {
        Point::new(point.lon, point.lat)
    }
}

/// Every coordinate shape accepted on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum GeopointRepr {
    Pair([f64; 2]),
    Short { lon: f64, lat: f64 },
    Long { longitude: f64, latitude: f64 },
    Text(String),
}

impl TryFrom<GeopointRepr> for Geopoint {
    type Error = Error;

    fn try_from(repr: GeopointRepr) -> Result<Self> {
        match repr {
            GeopointRepr::Pair([lon, lat]) => Ok(Geopoint::new(lon, lat)),
            GeopointRepr::Short { lon, lat } => Ok(Geopoint::new(lon, lat)),
            GeopointRepr::Long {
                longitude,
                latitude,
            } => Ok(Geopoint::new(longitude, latitude)),
            GeopointRepr::Text(text) => text.parse(),
        }
    }
}

/// Destination point `distance` meters from `origin` along great-circle `bearing`.
///
/// Uses the spherical (haversine) earth model. Bearing is in degrees, clockwise
/// from north, and must lie in `[0, 360)`.
pub fn project(origin: Geopoint, distance: f64, bearing: f64) -> Result<Geopoint> {
    origin.validate()?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(Error::InvalidGeometryInput(format!(
            "distance {distance} must be a finite, non-negative number of meters"
        )));
    }
    if !bearing.is_finite() || !(0.0..360.0).contains(&bearing) {
        return Err(Error::InvalidGeometryInput(format!(
            "bearing {bearing} outside [0, 360)"
        )));
    }

    if distance == 0.0 {
        return Ok(origin);
    }

    let destination = Haversine.destination(Point::from(origin), bearing, distance);
    Ok(Geopoint::new(
        normalize_longitude(destination.x()),
        destination.y(),
    ))
}

/// Wraps a longitude back into `[-180, 180)` after crossing the antimeridian
fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 540.0).rem_euclid(360.0) - 180.0
    }
}
