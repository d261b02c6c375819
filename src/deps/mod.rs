//! Dependency extraction from compiled rule blocks.
//!
//! Walks every rule record once and accumulates:
//! - the distinct source-table attributes that fetch rules read
//!   (wildcard patterns are kept verbatim here, see [`wildcard`])
//! - the derived `rout_*` tables that bind rules read, with the variables
//!   bound from each

pub mod wildcard;

use crate::rules::{Rule, RuleBlock};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Prefix of the output table each rule block writes to
pub const DERIVED_TABLE_PREFIX: &str = "rout_";

/// Distinct attribute names. Ordered so iteration (and draw order) is stable.
pub type AttributeSet = BTreeSet<String>;

/// Derived table name -> variables bound from it
pub type BindingMap = BTreeMap<String, BTreeSet<String>>;

/// Everything a set of rule blocks needs materialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Dependencies {
    pub attributes: AttributeSet,
    pub bindings: BindingMap,
}

impl Dependencies {
    /// Fold another extraction result into this one
    pub fn merge(&mut self, other: Dependencies) {
        self.attributes.extend(other.attributes);
        for (table, vars) in other.bindings {
            self.bindings.entry(table).or_default().extend(vars);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.bindings.is_empty()
    }

    /// Attributes that are wildcard patterns
    pub fn wildcard_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .map(String::as_str)
            .filter(|a| wildcard::is_wildcard(a))
    }
}

/// Name of the derived table a rule block writes to
pub fn derived_table_name(ruleblock: &str) -> String {
    format!("{}{}", DERIVED_TABLE_PREFIX, ruleblock)
}

/// Accumulator scoped to a single extraction
#[derive(Debug, Default)]
struct DependencyBuilder {
    attributes: AttributeSet,
    bindings: BindingMap,
}

impl DependencyBuilder {
    fn visit(&mut self, rule: &Rule) {
        match rule {
            Rule::Fetch(fetch) => {
                self.attributes
                    .extend(fetch.attribute_list.iter().cloned());
            }
            Rule::Bind(bind) => {
                self.bindings
                    .entry(derived_table_name(&bind.source_ruleblock))
                    .or_default()
                    .insert(bind.source_variable.clone());
            }
            // Compute rules only read variables that are already derived
            Rule::Compute(_) => {}
            Rule::Unknown => {}
        }
    }

    fn build(self) -> Dependencies {
        Dependencies {
            attributes: self.attributes,
            bindings: self.bindings,
        }
    }
}

/// Extract required attributes and bindings from rule blocks
pub fn extract_dependencies(blocks: &[RuleBlock]) -> Dependencies {
    let mut builder = DependencyBuilder::default();
    for block in blocks {
        for rule in &block.rules {
            builder.visit(rule);
        }
    }
    let deps = builder.build();
    tracing::debug!(
        blocks = blocks.len(),
        attributes = deps.attributes.len(),
        derived_tables = deps.bindings.len(),
        "extracted dependencies"
    );
    deps
}
