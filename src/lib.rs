//! Synthetic EADV fixtures for clinical rule-engine tests.
//!
//! Given compiled rule blocks, [`deps::extract_dependencies`] finds which
//! source attributes and derived `rout_*` tables the rules read, and
//! [`generator::generate_fixture`] produces deterministic, seeded
//! observation rows and binding rows that satisfy them.

pub mod dates;
pub mod deps;
pub mod generator;
pub mod json_schema;
pub mod output;
pub mod rng;
pub mod rules;

pub use deps::{extract_dependencies, Dependencies};
pub use generator::{generate_fixture, GeneratedFixture, GenerationOptions};
pub use rng::SeededRandom;
pub use rules::{load_rule_blocks, RuleBlock};
