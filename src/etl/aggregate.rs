use std::collections::BTreeMap;

use crate::data::osm::{ElementKind, OsmId, RawElement, Tags};
use crate::data::route::Coordinate;
use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPoint {
    pub id: OsmId,
    pub at: Coordinate,
    pub tags: Tags,
}

/// A way reduced to the mean of its nodes, carrying the way's own tags.
#[derive(Debug, Clone, PartialEq)]
pub struct WayCentroid {
    pub id: OsmId,
    pub centre: Coordinate,
    pub tags: Tags,
}

/// One response batch, split by kind and ordered by id.
#[derive(Debug, Default)]
pub struct Resolved {
    pub points: Vec<ResolvedPoint>,
    pub way_centroids: Vec<WayCentroid>,
}

/// Indexes the batch by id and reduces each way to its centroid. Fails if a
/// way has no nodes or references a node missing from the batch.
pub fn resolve(elements: Vec<RawElement>) -> Result<Resolved> {
    let mut nodes: BTreeMap<OsmId, ResolvedPoint> = BTreeMap::new();
    let mut ways: BTreeMap<OsmId, RawElement> = BTreeMap::new();
    for element in elements {
        match element.kind {
            ElementKind::Node => {
                let at = node_coordinate(&element)?;
                nodes.insert(element.id, ResolvedPoint { id: element.id, at, tags: element.tags });
            }
            ElementKind::Way => {
                ways.insert(element.id, element);
            }
        }
    }

    let way_centroids = ways.into_values()
        .map(|way| {
            let centre = centroid(&way, &nodes)?;
            Ok(WayCentroid { id: way.id, centre, tags: way.tags })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Resolved {
        points: nodes.into_values().collect(),
        way_centroids,
    })
}

fn node_coordinate(node: &RawElement) -> Result<Coordinate> {
    match (node.lat, node.lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
            .map_err(|err| Error::consistency(format!("node {}: {}", node.id, err.message))),
        _ => Err(Error::consistency(format!("node {} has no coordinates", node.id))),
    }
}

fn centroid(way: &RawElement, nodes: &BTreeMap<OsmId, ResolvedPoint>) -> Result<Coordinate> {
    if way.nodes.is_empty() {
        return Err(Error::consistency(format!("no nodes for way {}", way.id)));
    }
    let (mut lat, mut lon) = (0.0_f64, 0.0_f64);
    for node_id in &way.nodes {
        let node = nodes.get(node_id)
            .ok_or_else(|| Error::consistency(format!("node {} of way {} not found", node_id, way.id)))?;
        lat += node.at.lat;
        lon += node.at.lon;
    }
    let count = way.nodes.len() as f64;
    Ok(Coordinate { lat: lat / count, lon: lon / count })
}
