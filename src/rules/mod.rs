//! Rule-block input contract.
//!
//! The upstream rule compiler emits a list of named rule blocks, each an
//! ordered list of typed rule records. Only the fields needed for
//! dependency extraction are modelled; everything else in the document is
//! ignored on load.

mod loader;

pub use loader::{load_rule_blocks, parse_rule_blocks, DocumentFormat};

use serde::{Deserialize, Serialize};

/// A named block of rules, as produced by the rule compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBlock {
    /// Rule block name (also the suffix of its `rout_` output table)
    pub name: String,
    /// Rules in source order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleBlock {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

/// A compiled rule record, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rule {
    /// Fetch one or more attributes from a source table
    #[serde(alias = "FETCH", alias = "Fetch")]
    Fetch(FetchRule),
    /// Bind a variable computed by another rule block
    #[serde(alias = "BIND", alias = "Bind")]
    Bind(BindRule),
    /// Compute a variable from already-derived variables
    #[serde(alias = "COMPUTE", alias = "Compute")]
    Compute(ComputeRule),
    /// Any rule type this crate does not know about
    #[serde(other)]
    Unknown,
}

impl Rule {
    /// Shorthand for a fetch from the `eadv` source table
    pub fn fetch<I, S>(assigned_variable: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::Fetch(FetchRule {
            assigned_variable: assigned_variable.to_string(),
            source_table: DEFAULT_SOURCE_TABLE.to_string(),
            attribute_list: attributes.into_iter().map(Into::into).collect(),
            property: None,
            function: None,
        })
    }

    pub fn bind(assigned_variable: &str, source_ruleblock: &str, source_variable: &str) -> Self {
        Rule::Bind(BindRule {
            assigned_variable: assigned_variable.to_string(),
            source_ruleblock: source_ruleblock.to_string(),
            source_variable: source_variable.to_string(),
            property: None,
        })
    }

    pub fn compute(assigned_variable: &str, conditions: Vec<ComputeBranch>) -> Self {
        Rule::Compute(ComputeRule {
            assigned_variable: assigned_variable.to_string(),
            conditions,
        })
    }

    /// Lowercase rule type name
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Fetch(_) => "fetch",
            Rule::Bind(_) => "bind",
            Rule::Compute(_) => "compute",
            Rule::Unknown => "unknown",
        }
    }

    /// Variable this rule assigns, if known
    pub fn assigned_variable(&self) -> Option<&str> {
        match self {
            Rule::Fetch(r) => Some(&r.assigned_variable),
            Rule::Bind(r) => Some(&r.assigned_variable),
            Rule::Compute(r) => Some(&r.assigned_variable),
            Rule::Unknown => None,
        }
    }
}

/// Source table name used when a fetch rule omits one
pub const DEFAULT_SOURCE_TABLE: &str = "eadv";

fn default_source_table() -> String {
    DEFAULT_SOURCE_TABLE.to_string()
}

/// `x => eadv.[att1, att2].dt.max()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRule {
    #[serde(alias = "assignedVariable")]
    pub assigned_variable: String,
    #[serde(default = "default_source_table", alias = "sourceTable")]
    pub source_table: String,
    /// Attribute names, possibly wildcard patterns such as `icd_n18%`
    #[serde(default, alias = "attributeList")]
    pub attribute_list: Vec<String>,
    /// Row property read by the fetch (`val`, `dt`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Aggregation function (`max`, `count`, `last`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// `x => rout_ckd.ckd.val.bind()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindRule {
    #[serde(alias = "assignedVariable")]
    pub assigned_variable: String,
    #[serde(alias = "sourceRuleblock", alias = "source_rule_block")]
    pub source_ruleblock: String,
    #[serde(alias = "sourceVariable")]
    pub source_variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRule {
    #[serde(alias = "assignedVariable")]
    pub assigned_variable: String,
    #[serde(default)]
    pub conditions: Vec<ComputeBranch>,
}

/// One `{predicate} => value` arm; a missing predicate is the default arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeBranch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(alias = "returnValue")]
    pub return_value: serde_json::Value,
}

impl ComputeBranch {
    pub fn new(predicate: Option<&str>, return_value: impl Into<serde_json::Value>) -> Self {
        Self {
            predicate: predicate.map(str::to_string),
            return_value: return_value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kinds() {
        assert_eq!(Rule::fetch("egfr", ["lab_bld_egfr"]).kind(), "fetch");
        assert_eq!(Rule::bind("ckd", "ckd", "ckd").kind(), "bind");
        assert_eq!(Rule::compute("x", vec![]).kind(), "compute");
        assert_eq!(Rule::Unknown.kind(), "unknown");
        assert_eq!(Rule::Unknown.assigned_variable(), None);
    }

    #[test]
    fn test_fetch_shorthand_uses_eadv() {
        let Rule::Fetch(fetch) = Rule::fetch("acr", ["lab_ua_acr"]) else {
            panic!("expected fetch rule");
        };
        assert_eq!(fetch.source_table, "eadv");
        assert_eq!(fetch.attribute_list, vec!["lab_ua_acr".to_string()]);
    }
}
