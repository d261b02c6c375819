//! Fixture writers.

pub mod json;
pub mod sql;

pub use json::write_json;
pub use sql::{render_sql, write_sql, SqlDialect, SqlWriterConfig};

use crate::generator::GeneratedFixture;
use std::io::Write;

/// Output format for generated fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Sql,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "sql" => Ok(OutputFormat::Sql),
            _ => Err(format!("Unknown format: {}. Valid options: json, sql", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sql => write!(f, "sql"),
        }
    }
}

/// Write `fixture` in `format`; `sql` is only read for SQL output
pub fn write_fixture<W: Write>(
    fixture: &GeneratedFixture,
    format: OutputFormat,
    sql: &SqlWriterConfig,
    writer: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(fixture, writer),
        OutputFormat::Sql => Ok(write_sql(fixture, sql, writer)?),
    }
}
