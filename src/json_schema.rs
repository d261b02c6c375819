//! JSON Schema generation for CLI output types.
//!
//! Schemas are generated with schemars and exported via the `schema`
//! subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// All JSON schemas, keyed by the command whose `--json`/JSON output they
/// describe. BTreeMap keeps the listing stable.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // deps --json
    schemas.insert("deps", schema_for!(crate::deps::Dependencies));

    // generate --format json
    schemas.insert("generate", schema_for!(crate::generator::GeneratedFixture));

    schemas
}

/// Schema for a single command
pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

/// Names of all available schemas
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
