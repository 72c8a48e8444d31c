use crate::errors::{Error, Result};

/// A route position in degrees. Always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Coordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(Error::input(format!("non-finite coordinate ({}, {})", lat, lon)));
        }
        Ok(Coordinate { lat, lon })
    }
}

/// Contiguous, ordered slice of the route queried as one polyline.
pub type RouteChunk = Vec<Coordinate>;
