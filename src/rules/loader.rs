//! Loading rule-block documents from YAML or JSON.

use super::RuleBlock;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Serialization format of a rule-block document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.json` files are JSON, everything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Either a bare list of blocks or `{ ruleblocks: [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDocument {
    Blocks(Vec<RuleBlock>),
    Wrapped {
        #[serde(alias = "ruleBlocks", alias = "rule_blocks")]
        ruleblocks: Vec<RuleBlock>,
    },
}

impl RuleDocument {
    fn into_blocks(self) -> Vec<RuleBlock> {
        match self {
            RuleDocument::Blocks(blocks) => blocks,
            RuleDocument::Wrapped { ruleblocks } => ruleblocks,
        }
    }
}

/// Parse rule blocks from a string
pub fn parse_rule_blocks(content: &str, format: DocumentFormat) -> anyhow::Result<Vec<RuleBlock>> {
    let document: RuleDocument = match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).context("invalid JSON rule-block document")?
        }
        DocumentFormat::Yaml => {
            serde_yaml_ng::from_str(content).context("invalid YAML rule-block document")?
        }
    };
    Ok(document.into_blocks())
}

/// Read rule blocks from a file, picking the format from its extension
pub fn load_rule_blocks(path: &Path) -> anyhow::Result<Vec<RuleBlock>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read rule blocks from {}", path.display()))?;
    let blocks = parse_rule_blocks(&content, DocumentFormat::from_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let rule_count: usize = blocks.iter().map(|b| b.rules.len()).sum();
    tracing::debug!(
        path = %path.display(),
        blocks = blocks.len(),
        rules = rule_count,
        "loaded rule blocks"
    );
    Ok(blocks)
}
