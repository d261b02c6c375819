//! Rendering rulesets as rule-compiler documents.

use crate::generator::{BlockSpec, Ruleset};
use serde::Serialize;
use std::io::Write;

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            _ => Err(format!("Unknown format: {}. Use yaml or json", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub format: Format,
    /// Emit `{ruleblocks: [...]}` instead of a bare list
    pub wrapped: bool,
}

impl RenderConfig {
    pub fn yaml() -> Self {
        Self {
            format: Format::Yaml,
            wrapped: false,
        }
    }

    pub fn json() -> Self {
        Self {
            format: Format::Json,
            wrapped: false,
        }
    }

    pub fn wrapped(mut self) -> Self {
        self.wrapped = true;
        self
    }
}

#[derive(Serialize)]
struct Wrapped<'a> {
    ruleblocks: &'a [BlockSpec],
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn render_to_string(&self, ruleset: &Ruleset) -> anyhow::Result<String> {
        let blocks = ruleset.blocks.as_slice();
        let text = match (self.config.format, self.config.wrapped) {
            (Format::Yaml, false) => serde_yaml_ng::to_string(blocks)?,
            (Format::Yaml, true) => serde_yaml_ng::to_string(&Wrapped { ruleblocks: blocks })?,
            (Format::Json, false) => serde_json::to_string_pretty(blocks)?,
            (Format::Json, true) => {
                serde_json::to_string_pretty(&Wrapped { ruleblocks: blocks })?
            }
        };
        Ok(text)
    }

    pub fn render<W: Write>(&self, ruleset: &Ruleset, mut writer: W) -> anyhow::Result<()> {
        writer.write_all(self.render_to_string(ruleset)?.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
