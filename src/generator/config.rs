//! YAML configuration for the generate command.
//!
//! Every field is optional; unset fields leave [`GenerationOptions`] as it
//! is, so a config layers over the defaults and CLI flags layer over it.

use super::values::ValueGenerator;
use super::GenerationOptions;
use crate::dates::{parse_date, DateFormat, DateInterval, DistributionMode};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Complete YAML configuration for fixture generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureYamlConfig {
    pub seed: Option<u64>,
    pub entity_count: Option<usize>,
    pub start_entity_id: Option<i64>,
    pub observations_per_entity: Option<usize>,
    /// Interval start, RFC 3339 or `YYYY-MM-DD`
    pub start: Option<String>,
    /// Interval end, RFC 3339 or `YYYY-MM-DD`
    pub end: Option<String>,
    pub date_format: Option<DateFormat>,
    pub distribution: Option<DistributionMode>,
    pub include_bindings: Option<bool>,
    pub default_generator: Option<ValueGenerator>,
    /// Attribute name or wildcard pattern -> generator
    pub attributes: BTreeMap<String, ValueGenerator>,
    /// Derived table -> variable -> generator
    pub bindings: BTreeMap<String, BTreeMap<String, ValueGenerator>>,
}

impl FixtureYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: FixtureYamlConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    /// Interval from `start`/`end`, filling a missing bound from `current`
    fn interval(&self, current: &DateInterval) -> anyhow::Result<Option<DateInterval>> {
        if self.start.is_none() && self.end.is_none() {
            return Ok(None);
        }
        let start = match self.start {
            Some(ref s) => parse_date(s).context("config 'start'")?,
            None => current.start(),
        };
        let end = match self.end {
            Some(ref s) => parse_date(s).context("config 'end'")?,
            None => current.end(),
        };
        DateInterval::new(start, end).map(Some)
    }

    /// Overlay this config onto `options` and validate the result
    pub fn apply_to(&self, options: &mut GenerationOptions) -> anyhow::Result<()> {
        if let Some(seed) = self.seed {
            options.seed = Some(seed);
        }
        if let Some(n) = self.entity_count {
            options.entity_count = n;
        }
        if let Some(id) = self.start_entity_id {
            options.start_entity_id = id;
        }
        if let Some(n) = self.observations_per_entity {
            options.observations_per_entity = n;
        }
        if let Some(interval) = self.interval(&options.interval)? {
            options.interval = interval;
        }
        if let Some(format) = self.date_format {
            options.date_format = format;
        }
        if let Some(mode) = self.distribution {
            options.distribution = mode;
        }
        if let Some(include) = self.include_bindings {
            options.include_bindings = include;
        }
        if let Some(ref gen) = self.default_generator {
            options.default_generator = Some(gen.clone());
        }

        options.attribute_generators.extend(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        for (table, vars) in &self.bindings {
            options
                .binding_generators
                .entry(table.clone())
                .or_default()
                .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        options.validate()
    }
}
