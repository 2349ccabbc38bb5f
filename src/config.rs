//! Run configuration.
//!
//! Every section and field has a default, so an empty JSON object is a valid
//! configuration.  Library entry points take their parameters explicitly;
//! this module only gathers them in one serde-friendly place.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::geom::{Tessellation, NLCD_DEVELOPED};
use crate::harmonize::{HarmonizeRequest, WeightsMethod};
use crate::panel::{Time, VariableSpec};
use crate::weights::{Rule, SpatialWeights};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harmonize: HarmonizeConfig,

    #[serde(default)]
    pub weights: WeightsConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse configuration JSON")
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Harmonization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonizeConfig {
    #[serde(default)]
    pub method: WeightsMethod,

    /// In-mask raster classes for dasymetric weighting.
    #[serde(default = "default_codes")]
    pub codes: Vec<i32>,

    /// Layer whose boundaries the panel is harmonized onto.
    #[serde(default)]
    pub target_time: Option<Time>,
}

impl HarmonizeConfig {
    /// A request for `variables` using the configured method and codes.
    pub fn request(&self, variables: Vec<VariableSpec>) -> HarmonizeRequest {
        match self.method {
            WeightsMethod::Area => HarmonizeRequest::areal(variables),
            WeightsMethod::Dasymetric => HarmonizeRequest::dasymetric(variables, self.codes.clone()),
        }
    }
}

impl Default for HarmonizeConfig {
    fn default() -> Self {
        Self { method: WeightsMethod::default(), codes: default_codes(), target_time: None }
    }
}

/// Spatial weights settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Neighbor rule: `queen`, `rook`, `knn:<k>` or `distance:<radius>`.
    #[serde(default = "default_rule")]
    pub rule: String,

    /// Add reverse edges to graphs whose rule may be one-way (knn).
    #[serde(default)]
    pub symmetric: bool,
}

impl WeightsConfig {
    pub fn rule(&self) -> anyhow::Result<Rule> {
        self.rule.parse().with_context(|| format!("invalid weights rule {:?}", self.rule))
    }

    /// Build the configured graph over `tessellation`.
    pub fn build(&self, tessellation: &Tessellation) -> anyhow::Result<SpatialWeights> {
        let rule = self.rule()?;
        let weights = match self.symmetric {
            true => SpatialWeights::build_symmetric(tessellation, rule),
            false => SpatialWeights::build(tessellation, rule),
        };
        weights.with_context(|| format!("failed to build {rule} weights"))
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self { rule: default_rule(), symmetric: false }
    }
}

/// Markov simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub base_time: Option<Time>,

    #[serde(default = "default_steps")]
    pub steps: usize,

    #[serde(default)]
    pub seed: u64,

    /// Gap between synthetic layers; the observed gap when absent.
    #[serde(default)]
    pub time_step: Option<Time>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { base_time: None, steps: default_steps(), seed: 0, time_step: None }
    }
}

fn default_codes() -> Vec<i32> {
    NLCD_DEVELOPED.to_vec()
}

fn default_rule() -> String {
    "queen".to_string()
}

const fn default_steps() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.harmonize.method, WeightsMethod::Area);
        assert_eq!(config.harmonize.codes, vec![21, 22, 23, 24]);
        assert_eq!(config.weights.rule().unwrap(), Rule::Queen);
        assert_eq!(config.simulation.steps, 4);
    }

    #[test]
    fn partial_sections_are_filled_in() {
        let config = Config::from_json_str(r#"{
            "harmonize": { "method": "dasymetric", "codes": [22, 23] },
            "weights": { "rule": "knn:6" },
            "simulation": { "seed": 42, "time_step": 5 }
        }"#).unwrap();

        let request = config.harmonize.request(vec![VariableSpec::extensive("pop")]);
        assert_eq!(request.method, WeightsMethod::Dasymetric);
        assert_eq!(request.codes, Some(vec![22, 23]));
        assert_eq!(config.weights.rule().unwrap(), Rule::Knn { k: 6 });
        assert_eq!(config.simulation.steps, 4);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.time_step, Some(5));
    }

    #[test]
    fn symmetric_knn_weights_from_config() {
        use crate::geom::test_support::{square, tessellation};

        let tess = tessellation(&[
            ("a", square(0.0, 0.0, 1.0)),
            ("b", square(1.0, 0.0, 1.0)),
            ("c", square(3.0, 0.0, 1.0)),
        ]);

        let config = Config::from_json_str(r#"{"weights": {"rule": "knn:1", "symmetric": true}}"#).unwrap();
        let weights = config.weights.build(&tess).unwrap();
        assert!(weights.is_symmetric());
        assert_eq!(weights.degree(&"b".into()), 2);

        let config = Config::from_json_str(r#"{"weights": {"rule": "knn:1"}}"#).unwrap();
        assert!(!config.weights.build(&tess).unwrap().is_symmetric());
    }

    #[test]
    fn bad_rule_is_reported() {
        let config = Config::from_json_str(r#"{"weights": {"rule": "hexagon"}}"#).unwrap();
        let err = config.weights.rule().unwrap_err();
        assert!(err.to_string().contains("hexagon"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json_str("{ not json").is_err());
    }
}
