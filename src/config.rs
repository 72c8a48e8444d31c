use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::rules::{build_rules, default_rule_specs, Rule, RuleSpec, DEFAULT_RADIUS_M};
use crate::errors::{Error, Result};
use crate::etl::cache::DEFAULT_ENDPOINT;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Gpx,
    Json,
}

impl OutputFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Gpx => "pois.gpx",
            OutputFormat::Json => "pois.json",
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub route_path: PathBuf,
    pub cache_dir: PathBuf,
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_chunks")]
    pub chunks: usize,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
    #[serde(default = "default_rule_specs")]
    pub rules: Vec<RuleSpec>,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_chunks() -> usize {
    10
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_radius_m() -> u32 {
    DEFAULT_RADIUS_M
}

impl UserConfig {
    pub fn load(path: &Path) -> Result<UserConfig> {
        let file = File::open(path)
            .map_err(|err| Error::from(err).context(format!("opening config {}", path.display())))?;
        let config: UserConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| Error::from(err).context(format!("parsing config {}", path.display())))?;
        if config.chunks == 0 {
            return Err(Error::input("chunks must be at least 1"));
        }
        Ok(config)
    }

    /// Validates the configured rules, failing on the first bad condition.
    pub fn rules(&self) -> Result<Vec<Rule>> {
        build_rules(self.rules.clone(), self.default_radius_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let file = write_config(r#"{"route_path": "route.gpx", "cache_dir": "state"}"#);
        let config = UserConfig::load(file.path()).unwrap();
        assert_eq!(config.chunks, 10);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.output_format, OutputFormat::Gpx);
        assert_eq!(config.output_root, PathBuf::from("output"));
        assert_eq!(config.rules().unwrap().len(), 6);
        assert!(config.rules().unwrap().iter().all(|rule| rule.radius_m() == DEFAULT_RADIUS_M));
    }

    #[test]
    fn custom_rules_and_radius() {
        let file = write_config(r#"{
            "route_path": "route.gpx.xz",
            "cache_dir": "state",
            "output_format": "json",
            "default_radius_m": 200,
            "rules": [{"conditions": [{"key": "shop", "one_of": ["bakery"]}]}]
        }"#);
        let config = UserConfig::load(file.path()).unwrap();
        let rules = config.rules().unwrap();
        assert_eq!(config.output_format.file_name(), "pois.json");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].radius_m(), 200);
    }

    #[test]
    fn invalid_condition_is_reported() {
        let file = write_config(r#"{
            "route_path": "route.gpx",
            "cache_dir": "state",
            "rules": [{"conditions": [{"key": "shop", "one_of": ["bakery"], "exists": true}]}]
        }"#);
        let err = UserConfig::load(file.path()).unwrap().rules().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("shop"));
    }

    #[test]
    fn zero_chunks_is_rejected() {
        let file = write_config(r#"{"route_path": "r.gpx", "cache_dir": "s", "chunks": 0}"#);
        assert_eq!(UserConfig::load(file.path()).unwrap_err().kind, ErrorKind::Input);
    }
}
