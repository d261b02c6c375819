//! INSERT scripts for generated fixtures.
//!
//! One batched INSERT per `batch_size` rows. Oracle has no multi-row
//! `VALUES`, so its batches are `INSERT ALL ... SELECT 1 FROM DUAL`.

use crate::dates::DateFormat;
use crate::generator::{BindingRow, GeneratedFixture, SourceRecord, Value};
use crate::rules::DEFAULT_SOURCE_TABLE;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Rows per INSERT statement
pub const DEFAULT_BATCH_SIZE: usize = 100;

const SOURCE_COLUMNS: [&str; 4] = ["eid", "att", "dt", "val"];

/// Target database dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Oracle,
    Mssql,
    Postgres,
}

impl std::str::FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oracle" => Ok(SqlDialect::Oracle),
            "mssql" | "sqlserver" | "tsql" => Ok(SqlDialect::Mssql),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: oracle, mssql, postgres",
                s
            )),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::Oracle => write!(f, "oracle"),
            SqlDialect::Mssql => write!(f, "mssql"),
            SqlDialect::Postgres => write!(f, "postgres"),
        }
    }
}

/// SQL writer settings
#[derive(Debug, Clone)]
pub struct SqlWriterConfig {
    pub dialect: SqlDialect,
    /// Table the source rows are inserted into
    pub source_table: String,
    pub batch_size: usize,
}

impl Default for SqlWriterConfig {
    fn default() -> Self {
        Self {
            dialect: SqlDialect::default(),
            source_table: DEFAULT_SOURCE_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SqlWriterConfig {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    pub fn with_source_table(mut self, table: impl Into<String>) -> Self {
        self.source_table = table.into();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }
}

/// Quote a string literal for `dialect`
pub fn quote_string(s: &str, dialect: SqlDialect) -> String {
    let escaped = s.replace('\'', "''");
    match dialect {
        SqlDialect::Mssql => format!("N'{}'", escaped),
        _ => format!("'{}'", escaped),
    }
}

fn format_value(value: &Value, dialect: SqlDialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) if n.is_finite() => n.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::Text(s) => quote_string(s, dialect),
    }
}

/// Date literal for a value already rendered in `format`
fn format_date(dt: &str, format: DateFormat, dialect: SqlDialect) -> String {
    match dialect {
        SqlDialect::Oracle => match format {
            DateFormat::Oracle => format!("TO_DATE('{}', 'DD-MON-YYYY')", dt),
            DateFormat::Iso => format!(
                "TO_TIMESTAMP('{}', 'YYYY-MM-DD\"T\"HH24:MI:SS.FF3\"Z\"')",
                dt
            ),
            DateFormat::Mssql => {
                format!("TO_TIMESTAMP('{}', 'YYYY-MM-DD HH24:MI:SS.FF3')", dt)
            }
        },
        _ => format!("'{}'", dt),
    }
}

fn batched_inserts(
    table: &str,
    columns: &[&str],
    rows: &[Vec<String>],
    config: &SqlWriterConfig,
) -> Vec<String> {
    let column_list = columns.join(", ");
    let batch_size = config.batch_size.max(1);

    rows.chunks(batch_size)
        .map(|chunk| {
            let mut insert = String::new();
            match config.dialect {
                SqlDialect::Oracle => {
                    insert.push_str("INSERT ALL\n");
                    for row in chunk {
                        insert.push_str(&format!(
                            "  INTO {} ({}) VALUES ({})\n",
                            table,
                            column_list,
                            row.join(", ")
                        ));
                    }
                    insert.push_str("SELECT 1 FROM DUAL;");
                }
                SqlDialect::Mssql | SqlDialect::Postgres => {
                    insert.push_str(&format!("INSERT INTO {} ({}) VALUES\n", table, column_list));
                    for (i, row) in chunk.iter().enumerate() {
                        if i > 0 {
                            insert.push_str(",\n");
                        }
                        insert.push('(');
                        insert.push_str(&row.join(", "));
                        insert.push(')');
                    }
                    insert.push(';');
                }
            }
            insert
        })
        .collect()
}

fn source_statements(
    rows: &[SourceRecord],
    date_format: DateFormat,
    config: &SqlWriterConfig,
) -> Vec<String> {
    let values: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.eid.to_string(),
                quote_string(&r.att, config.dialect),
                format_date(&r.dt, date_format, config.dialect),
                format_value(&r.val, config.dialect),
            ]
        })
        .collect();
    batched_inserts(&config.source_table, &SOURCE_COLUMNS, &values, config)
}

fn binding_statements(table: &str, rows: &[BindingRow], config: &SqlWriterConfig) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut columns = vec!["eid"];
    columns.extend(first.values.keys().map(String::as_str));

    let values: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            std::iter::once(row.eid.to_string())
                .chain(columns[1..].iter().map(|col| {
                    row.values
                        .get(*col)
                        .map(|v| format_value(v, config.dialect))
                        .unwrap_or_else(|| "NULL".to_string())
                }))
                .collect()
        })
        .collect();
    batched_inserts(table, &columns, &values, config)
}

/// All INSERT statements for a fixture: source table first, then each
/// derived table in name order
pub fn render_sql(fixture: &GeneratedFixture, config: &SqlWriterConfig) -> Vec<String> {
    let mut statements =
        source_statements(&fixture.source_rows, fixture.metadata.date_format, config);
    for (table, rows) in &fixture.binding_tables {
        statements.extend(binding_statements(table, rows, config));
    }
    statements
}

/// Write the fixture as a SQL script
pub fn write_sql<W: Write>(
    fixture: &GeneratedFixture,
    config: &SqlWriterConfig,
    writer: &mut W,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "-- eadv-synth fixture: {} entities, {} source rows, seed {}",
        fixture.metadata.entity_ids.len(),
        fixture.metadata.total_source_rows,
        fixture.metadata.seed
    )?;
    writeln!(writer, "-- dialect: {}", config.dialect)?;
    for statement in render_sql(fixture, config) {
        writer.write_all(statement.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
