use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

pub type OsmId = i64;

/// Element tags, kept sorted so serialised descriptions are stable.
pub type Tags = BTreeMap<String, Value>;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element as returned by the upstream service. `lat`/`lon` are only set on
/// nodes and `nodes` only on ways.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: OsmId,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<OsmId>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Deserialize, Debug)]
pub struct OsmResponse {
    pub elements: Vec<RawElement>,
}
