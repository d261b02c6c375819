//! Textual date conventions for generated rows.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for observation dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `2024-03-05T14:07:09.123Z`
    #[default]
    Iso,
    /// `05-MAR-2024`
    Oracle,
    /// `2024-03-05 14:07:09.123`
    Mssql,
}

impl DateFormat {
    pub fn format(&self, date: &DateTime<Utc>) -> String {
        match self {
            DateFormat::Iso => date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            DateFormat::Oracle => date.format("%d-%b-%Y").to_string().to_uppercase(),
            DateFormat::Mssql => date.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        }
    }
}

impl std::str::FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iso" | "iso8601" => Ok(DateFormat::Iso),
            "oracle" => Ok(DateFormat::Oracle),
            "mssql" | "sqlserver" => Ok(DateFormat::Mssql),
            _ => Err(format!(
                "Unknown date format: {}. Valid options: iso, oracle, mssql",
                s
            )),
        }
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateFormat::Iso => write!(f, "iso"),
            DateFormat::Oracle => write!(f, "oracle"),
            DateFormat::Mssql => write!(f, "mssql"),
        }
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected RFC 3339 or YYYY-MM-DD", s))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .with_context(|| format!("invalid date '{}'", s))
}
