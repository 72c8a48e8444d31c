use crate::data::osm::{OsmResponse, RawElement};
use crate::errors::{Error, Result};

/// Parses an Overpass JSON body. Every element is returned, unfiltered.
pub fn decode(body: &[u8]) -> Result<Vec<RawElement>> {
    let response: OsmResponse = serde_json::from_slice(body)
        .map_err(|err| Error::from(err).context("decoding upstream response"))?;
    Ok(response.elements)
}
