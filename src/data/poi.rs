use std::cmp::Ordering;

use serde::Serialize;

use super::route::Coordinate;

/// A named, symbol-tagged waypoint near the route.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Poi {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "sym")]
    pub symbol: String,
}

impl Poi {
    pub fn new(name: String, at: Coordinate, description: String, symbol: String) -> Poi {
        Poi {
            name,
            lat: at.lat,
            lon: at.lon,
            description,
            symbol,
        }
    }

    /// Total order: name, description, symbol, latitude, longitude.
    pub fn output_cmp(&self, other: &Poi) -> Ordering {
        self.name.cmp(&other.name)
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.symbol.cmp(&other.symbol))
            .then_with(|| self.lat.total_cmp(&other.lat))
            .then_with(|| self.lon.total_cmp(&other.lon))
    }
}

/// Puts POIs in output order, independent of discovery order.
pub fn sort_for_output(pois: &mut [Poi]) {
    pois.sort_by(Poi::output_cmp);
}
