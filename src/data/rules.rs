use serde::Deserialize;

use crate::errors::{Error, Result};

pub const DEFAULT_RADIUS_M: u32 = 80;

/// A single tag predicate. Exactly one mode per condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The tag value is one of `values`, matched exactly.
    OneOf { key: String, values: Vec<String> },
    /// The tag value is none of `values`.
    NoneOf { key: String, values: Vec<String> },
    /// The tag is present (`present = true`) or absent.
    Exists { key: String, present: bool },
}

/// A condition as written in the user config, before the mode is checked.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConditionSpec {
    pub key: String,
    pub one_of: Option<Vec<String>>,
    pub none_of: Option<Vec<String>>,
    pub exists: Option<bool>,
}

impl ConditionSpec {
    pub fn one_of(key: &str, values: &[&str]) -> ConditionSpec {
        ConditionSpec {
            key: key.to_string(),
            one_of: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn none_of(key: &str, values: &[&str]) -> ConditionSpec {
        ConditionSpec {
            key: key.to_string(),
            none_of: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn exists(key: &str, present: bool) -> ConditionSpec {
        ConditionSpec {
            key: key.to_string(),
            exists: Some(present),
            ..Default::default()
        }
    }
}

impl TryFrom<ConditionSpec> for Condition {
    type Error = Error;

    fn try_from(spec: ConditionSpec) -> Result<Condition> {
        if spec.key.is_empty() {
            return Err(Error::validation("condition has an empty key"));
        }
        let condition = match (spec.one_of, spec.none_of, spec.exists) {
            (Some(values), None, None) => Condition::OneOf { key: spec.key, values },
            (None, Some(values), None) => Condition::NoneOf { key: spec.key, values },
            (None, None, Some(present)) => Condition::Exists { key: spec.key, present },
            (None, None, None) => {
                return Err(Error::validation(format!("condition on {:?} sets no mode", spec.key)))
            }
            _ => {
                return Err(Error::validation(format!(
                    "condition on {:?} sets more than one of one_of, none_of, exists",
                    spec.key
                )))
            }
        };
        match &condition {
            Condition::OneOf { key, values } | Condition::NoneOf { key, values } if values.is_empty() => {
                Err(Error::validation(format!("condition on {:?} has an empty value list", key)))
            }
            _ => Ok(condition),
        }
    }
}

/// A search specification: all conditions must hold within `radius_m` of the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    radius_m: u32,
    conditions: Vec<Condition>,
}

impl Rule {
    pub fn new(radius_m: u32, conditions: Vec<Condition>) -> Result<Rule> {
        if conditions.is_empty() {
            return Err(Error::validation("rule has no conditions"));
        }
        Ok(Rule { radius_m, conditions })
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub radius_m: Option<u32>,
    pub conditions: Vec<ConditionSpec>,
}

impl RuleSpec {
    fn new(conditions: Vec<ConditionSpec>) -> RuleSpec {
        RuleSpec {
            radius_m: None,
            conditions,
        }
    }

    pub fn into_rule(self, default_radius_m: u32) -> Result<Rule> {
        let conditions = self.conditions
            .into_iter()
            .enumerate()
            .map(|(idx, spec)| {
                Condition::try_from(spec).map_err(|err| err.context(format!("condition #{}", idx + 1)))
            })
            .collect::<Result<Vec<_>>>()?;
        Rule::new(self.radius_m.unwrap_or(default_radius_m), conditions)
    }
}

/// Validates every rule spec, naming the rule that failed.
pub fn build_rules(specs: Vec<RuleSpec>, default_radius_m: u32) -> Result<Vec<Rule>> {
    specs.into_iter()
        .enumerate()
        .map(|(idx, spec)| spec.into_rule(default_radius_m).map_err(|err| err.context(format!("rule #{}", idx + 1))))
        .collect()
}

/// Amenities, accommodation, water and natural features worth stopping for.
pub fn default_rule_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new(vec![ConditionSpec::one_of("amenity", &[
            "bar", "biergarten", "cafe", "fast_food", "food_court", "fuel", "ice_cream", "pub",
            "restaurant", "bicycle_repair_station", "compressed_air", "drinking_water", "shelter",
            "toilets", "water_point", "marketplace", "place_of_worship",
        ])]),
        RuleSpec::new(vec![ConditionSpec::one_of("tourism", &[
            "alpine_hut", "camp_pitch", "camp_site", "guest_house", "hostel", "picnic_site",
            "viewpoint", "wilderness_hut",
        ])]),
        RuleSpec::new(vec![
            ConditionSpec::one_of("amenity", &["fountain"]),
            ConditionSpec::none_of("drinking_water", &["no"]),
            ConditionSpec::exists("drinking_water", true),
        ]),
        RuleSpec::new(vec![ConditionSpec::one_of("leisure", &[
            "nature_reserve", "park", "picnic_table", "wildlife_hide",
        ])]),
        RuleSpec::new(vec![ConditionSpec::one_of("natural", &["spring", "peak"])]),
        RuleSpec::new(vec![ConditionSpec::one_of("man_made", &["spring_box", "water_well", "water_tap"])]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn condition_with_no_mode_is_rejected() {
        let err = Condition::try_from(ConditionSpec { key: "amenity".into(), ..Default::default() }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("amenity"));
    }

    #[test]
    fn condition_with_two_modes_is_rejected() {
        let spec = ConditionSpec {
            key: "drinking_water".into(),
            none_of: Some(vec!["no".into()]),
            exists: Some(true),
            ..Default::default()
        };
        let err = Condition::try_from(spec).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("drinking_water"));
    }

    #[test]
    fn empty_value_list_is_rejected() {
        let err = Condition::try_from(ConditionSpec::one_of("amenity", &[])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn rule_needs_conditions() {
        assert_eq!(Rule::new(80, vec![]).unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn failing_rule_is_named() {
        let specs = vec![
            RuleSpec::new(vec![ConditionSpec::exists("name", true)]),
            RuleSpec::new(vec![ConditionSpec::exists("name", true), ConditionSpec { key: "x".into(), ..Default::default() }]),
        ];
        let err = build_rules(specs, DEFAULT_RADIUS_M).unwrap_err();
        assert!(err.message.starts_with("rule #2: condition #2"), "{}", err.message);
    }

    #[test]
    fn rules_deserialize_from_config() {
        let json = r#"[
            {"radius_m": 150, "conditions": [{"key": "amenity", "one_of": ["cafe"]}]},
            {"conditions": [{"key": "drinking_water", "none_of": ["no"]}, {"key": "drinking_water", "exists": true}]}
        ]"#;
        let specs: Vec<RuleSpec> = serde_json::from_str(json).unwrap();
        let rules = build_rules(specs, DEFAULT_RADIUS_M).unwrap();
        assert_eq!(rules[0].radius_m(), 150);
        assert_eq!(rules[1].radius_m(), DEFAULT_RADIUS_M);
        assert_eq!(rules[1].conditions()[1], Condition::Exists { key: "drinking_water".into(), present: true });
    }

    #[test]
    fn default_rules_are_valid() {
        let rules = build_rules(default_rule_specs(), DEFAULT_RADIUS_M).unwrap();
        assert_eq!(rules.len(), 6);
        assert_eq!(rules[2].conditions().len(), 3);
    }
}
