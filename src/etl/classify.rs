use std::collections::BTreeMap;

use log::info;

use crate::data::osm::Tags;
use crate::data::poi::Poi;
use crate::data::route::Coordinate;
use crate::errors::{Error, Result};

/// Tag keys tried in order for a display name. An explicit name always wins.
pub const NAME_KEYS: &[&str] = &["name", "amenity", "tourism", "leisure", "natural", "man_made"];

pub struct SymbolRule {
    pub tags: &'static [(&'static str, &'static str)],
    pub symbol: &'static str,
}

const fn rule(tags: &'static [(&'static str, &'static str)], symbol: &'static str) -> SymbolRule {
    SymbolRule { tags, symbol }
}

/// First fully matching rule wins, so order matters.
pub const SYMBOL_RULES: &[SymbolRule] = &[
    rule(&[("leisure", "park")], "Park"),
    rule(&[("amenity", "toilets")], "Restroom"),
    rule(&[("amenity", "drinking_water")], "Drinking Water"),
    rule(&[("natural", "peak")], "Summit"),
    rule(&[("tourism", "viewpoint")], "Scenic Area"),
    rule(&[("amenity", "bicycle_repair_station")], "Mine"),
    rule(&[("amenity", "fast_food")], "Fast Food"),
    rule(&[("amenity", "fuel")], "Gas Station"),
    rule(&[("amenity", "pub")], "Bar"),
    rule(&[("amenity", "cafe")], "Restaurant"),
    rule(&[("tourism", "picnic_site")], "Picnic Area"),
    rule(&[("amenity", "restaurant"), ("cuisine", "pizza")], "Pizza"),
    rule(&[("amenity", "restaurant")], "Restaurant"),
    rule(&[("amenity", "ice_cream")], "Fast Food"),
    rule(&[("tourism", "camp_pitch")], "Campground"),
    rule(&[("leisure", "nature_reserve")], "Park"),
    rule(&[("amenity", "shelter")], "Building"),
    rule(&[("amenity", "place_of_worship")], "Church"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    pub name_key: &'static str,
    /// Empty when no symbol rule matched.
    pub symbol: &'static str,
}

/// Running counts over every classified element of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassificationStats {
    pub by_symbol: BTreeMap<&'static str, usize>,
    pub by_name_key: BTreeMap<&'static str, usize>,
    pub without_symbol: usize,
}

impl ClassificationStats {
    pub fn record(&mut self, classification: &Classification) {
        *self.by_name_key.entry(classification.name_key).or_default() += 1;
        if classification.symbol.is_empty() {
            self.without_symbol += 1;
        } else {
            *self.by_symbol.entry(classification.symbol).or_default() += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.by_name_key.values().sum()
    }

    pub fn log_summary(&self) {
        for (symbol, count) in &self.by_symbol {
            info!(symbol = *symbol, count = *count; "POIs per symbol");
        }
        for (name_key, count) in &self.by_name_key {
            info!(name_key = *name_key, count = *count; "POIs named by tag");
        }
        info!(total = self.total(), without_symbol = self.without_symbol; "Classification finished");
    }
}

pub fn resolve_name(tags: &Tags) -> Result<(&'static str, String)> {
    NAME_KEYS.iter()
        .find_map(|key| tags.get(*key).and_then(|value| value.as_str()).map(|name| (*key, name.to_string())))
        .ok_or_else(|| Error::classification("no suitable tag for name"))
}

pub fn resolve_symbol(tags: &Tags) -> &'static str {
    SYMBOL_RULES.iter()
        .find(|rule| rule.tags.iter().all(|(key, value)| tags.get(*key).and_then(|v| v.as_str()) == Some(*value)))
        .map(|rule| rule.symbol)
        .unwrap_or("")
}

pub fn classify(tags: &Tags) -> Result<Classification> {
    let (name_key, name) = resolve_name(tags)?;
    Ok(Classification {
        name,
        name_key,
        symbol: resolve_symbol(tags),
    })
}

/// Classifies `tags` and builds the POI, describing it by its full tag map.
pub fn build_poi(tags: &Tags, at: Coordinate, stats: &mut ClassificationStats) -> Result<Poi> {
    let description = serde_json::to_string(tags)?;
    let classification = classify(tags)
        .map_err(|err| err.context(format!("classifying tags {}", description)))?;
    stats.record(&classification);
    Ok(Poi::new(classification.name, at, description, classification.symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().map(|(k, v)| (k.to_string(), json!(v))).collect()
    }

    #[test]
    fn name_falls_back_to_category() {
        let (key, name) = resolve_name(&tags(&[("amenity", "cafe")])).unwrap();
        assert_eq!(key, "amenity");
        assert_eq!(name, "cafe");
    }

    #[test]
    fn explicit_name_wins() {
        let (_, name) = resolve_name(&tags(&[("amenity", "cafe"), ("name", "Joe's")])).unwrap();
        assert_eq!(name, "Joe's");
    }

    #[test]
    fn amenity_outranks_tourism() {
        let (_, name) = resolve_name(&tags(&[("tourism", "viewpoint"), ("amenity", "shelter")])).unwrap();
        assert_eq!(name, "shelter");
    }

    #[test]
    fn non_string_name_is_skipped() {
        let mut t = tags(&[("leisure", "park")]);
        t.insert("name".to_string(), json!(42));
        assert_eq!(resolve_name(&t).unwrap().1, "park");
    }

    #[test]
    fn unnamed_element_is_an_error() {
        let err = resolve_name(&tags(&[("highway", "path")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Classification);
        assert!(err.message.contains("no suitable tag for name"));
    }

    #[test]
    fn pizza_rule_precedes_plain_restaurant() {
        let pizza = SYMBOL_RULES.iter().position(|r| r.symbol == "Pizza").unwrap();
        let restaurant = SYMBOL_RULES.iter().position(|r| r.tags == [("amenity", "restaurant")]).unwrap();
        assert!(pizza < restaurant);
        assert_eq!(resolve_symbol(&tags(&[("amenity", "restaurant"), ("cuisine", "pizza")])), "Pizza");
        assert_eq!(resolve_symbol(&tags(&[("amenity", "restaurant"), ("cuisine", "thai")])), "Restaurant");
    }

    #[test]
    fn earlier_rule_wins_over_later_match() {
        // leisure=park is checked before amenity=toilets.
        assert_eq!(resolve_symbol(&tags(&[("amenity", "toilets"), ("leisure", "park")])), "Park");
    }

    #[test]
    fn unmatched_symbol_is_empty() {
        assert_eq!(resolve_symbol(&tags(&[("amenity", "marketplace")])), "");
    }

    #[test]
    fn build_poi_records_stats() {
        let mut stats = ClassificationStats::default();
        let at = Coordinate { lat: 1.0, lon: 2.0 };
        let cafe = build_poi(&tags(&[("amenity", "cafe"), ("name", "Joe's")]), at, &mut stats).unwrap();
        build_poi(&tags(&[("amenity", "marketplace")]), at, &mut stats).unwrap();

        assert_eq!(cafe.name, "Joe's");
        assert_eq!(cafe.symbol, "Restaurant");
        assert_eq!(cafe.description, r#"{"amenity":"cafe","name":"Joe's"}"#);
        assert_eq!(stats.total(), 2);
        assert_eq!(stats.without_symbol, 1);
        assert_eq!(stats.by_symbol.get("Restaurant"), Some(&1));
        assert_eq!(stats.by_name_key.get("amenity"), Some(&1));
    }

    #[test]
    fn failed_classification_leaves_stats_untouched() {
        let mut stats = ClassificationStats::default();
        let err = build_poi(&tags(&[("shop", "bakery")]), Coordinate { lat: 0.0, lon: 0.0 }, &mut stats).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Classification);
        assert!(err.message.contains("bakery"));
        assert_eq!(stats, ClassificationStats::default());
    }
}
