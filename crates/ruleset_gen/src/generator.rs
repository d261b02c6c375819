//! Rule block generator.
//!
//! Produces deterministic compiled rule blocks shaped like the rule
//! compiler's output. Bind rules only reference blocks generated earlier,
//! and only variables those blocks assign, so every ruleset is internally
//! consistent.

use crate::vocab::Vocabulary;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Generation scale presets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// 4 blocks, a handful of rules each
    Small,
    /// 20 blocks
    Medium,
    /// 100 blocks, for benchmarks
    Large,
}

impl Scale {
    pub fn blocks(&self) -> usize {
        match self {
            Scale::Small => 4,
            Scale::Medium => 20,
            Scale::Large => 100,
        }
    }

    pub fn rules_per_block(&self) -> usize {
        match self {
            Scale::Small => 4,
            Scale::Medium => 8,
            Scale::Large => 12,
        }
    }

    pub fn max_attributes_per_fetch(&self) -> usize {
        match self {
            Scale::Small => 2,
            Scale::Medium => 3,
            Scale::Large => 4,
        }
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Ok(Scale::Small),
            "medium" | "m" => Ok(Scale::Medium),
            "large" | "l" => Ok(Scale::Large),
            _ => Err(format!("Unknown scale: {}. Use small, medium, or large", s)),
        }
    }
}

/// One `{predicate} => value` arm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    pub return_value: serde_json::Value,
}

/// A compiled rule record, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleSpec {
    Fetch {
        assigned_variable: String,
        source_table: String,
        attribute_list: Vec<String>,
        property: String,
        function: String,
    },
    Bind {
        assigned_variable: String,
        source_ruleblock: String,
        source_variable: String,
    },
    Compute {
        assigned_variable: String,
        conditions: Vec<ConditionSpec>,
    },
}

impl RuleSpec {
    pub fn assigned_variable(&self) -> &str {
        match self {
            RuleSpec::Fetch {
                assigned_variable, ..
            }
            | RuleSpec::Bind {
                assigned_variable, ..
            }
            | RuleSpec::Compute {
                assigned_variable, ..
            } => assigned_variable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSpec {
    pub name: String,
    pub rules: Vec<RuleSpec>,
}

/// A generated ruleset
#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    pub blocks: Vec<BlockSpec>,
}

impl Ruleset {
    /// Distinct attributes read by fetch rules, computed independently of
    /// the extractor under test
    pub fn expected_attributes(&self) -> BTreeSet<String> {
        self.rules()
            .filter_map(|rule| match rule {
                RuleSpec::Fetch { attribute_list, .. } => Some(attribute_list.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// `rout_<block>` -> bound variables
    pub fn expected_bindings(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut bindings: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for rule in self.rules() {
            if let RuleSpec::Bind {
                source_ruleblock,
                source_variable,
                ..
            } = rule
            {
                bindings
                    .entry(format!("rout_{}", source_ruleblock))
                    .or_default()
                    .insert(source_variable.clone());
            }
        }
        bindings
    }

    pub fn rule_count(&self) -> usize {
        self.blocks.iter().map(|b| b.rules.len()).sum()
    }

    fn rules(&self) -> impl Iterator<Item = &RuleSpec> {
        self.blocks.iter().flat_map(|b| b.rules.iter())
    }
}

pub struct RulesetGenerator {
    scale: Scale,
    vocab: Vocabulary<ChaCha8Rng>,
}

impl RulesetGenerator {
    pub fn new(seed: u64, scale: Scale) -> Self {
        Self {
            scale,
            vocab: Vocabulary::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&mut self) -> Ruleset {
        let mut blocks: Vec<BlockSpec> = Vec::with_capacity(self.scale.blocks());
        for i in 0..self.scale.blocks() {
            let block = self.generate_block(i, &blocks);
            blocks.push(block);
        }
        Ruleset { blocks }
    }

    fn generate_block(&mut self, index: usize, earlier: &[BlockSpec]) -> BlockSpec {
        let name = self.vocab.block_name(index);
        let mut rules = Vec::with_capacity(self.scale.rules_per_block());

        for r in 0..self.scale.rules_per_block() {
            let var = format!("{}_v{}", name, r);
            let rule = if r == 0 {
                // every block reads at least one attribute
                self.fetch(var)
            } else if r + 1 == self.scale.rules_per_block() {
                self.compute(name.clone(), &rules)
            } else if !earlier.is_empty() && self.vocab.chance(0.3) {
                self.bind(var, earlier)
            } else if self.vocab.chance(0.7) {
                self.fetch(var)
            } else {
                self.compute(var, &rules)
            };
            rules.push(rule);
        }

        BlockSpec { name, rules }
    }

    fn fetch(&mut self, assigned_variable: String) -> RuleSpec {
        RuleSpec::Fetch {
            assigned_variable,
            source_table: "eadv".to_string(),
            attribute_list: self
                .vocab
                .attribute_list(self.scale.max_attributes_per_fetch()),
            property: self.vocab.property().to_string(),
            function: self.vocab.function().to_string(),
        }
    }

    fn bind(&mut self, assigned_variable: String, earlier: &[BlockSpec]) -> RuleSpec {
        let source = &earlier[self.vocab.index(earlier.len())];
        let variable = source.rules[self.vocab.index(source.rules.len())].assigned_variable();
        RuleSpec::Bind {
            assigned_variable,
            source_ruleblock: source.name.clone(),
            source_variable: variable.to_string(),
        }
    }

    fn compute(&mut self, assigned_variable: String, previous: &[RuleSpec]) -> RuleSpec {
        let mut conditions = Vec::new();
        if let Some(input) = previous.last() {
            conditions.push(ConditionSpec {
                predicate: Some(format!(
                    "{} > {}",
                    input.assigned_variable(),
                    self.vocab.threshold()
                )),
                return_value: serde_json::Value::from(1),
            });
        }
        conditions.push(ConditionSpec {
            predicate: None,
            return_value: serde_json::Value::from(0),
        });
        RuleSpec::Compute {
            assigned_variable,
            conditions,
        }
    }
}
