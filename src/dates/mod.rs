//! Observation date generation.
//!
//! Three sampling strategies spread `count` observations over an interval:
//!
//! - `uniform`: one observation per equal-width segment, jittered within the
//!   first 80% of its segment
//! - `recent_weighted`: inverse power transform biasing towards the end of
//!   the interval (λ = 2.5)
//! - `clustered`: up to three episode centers with Gaussian spread
//!
//! Every strategy returns dates sorted most recent first. Downstream
//! "latest observation" rules read the first element.

mod format;

pub use format::{parse_date, DateFormat};

use crate::rng::SeededRandom;
use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Fraction of a uniform segment an observation may fall in
pub const UNIFORM_JITTER: f64 = 0.8;
/// Recency decay constant λ
pub const RECENCY_DECAY: f64 = 2.5;
/// Cluster standard deviation as a fraction of the interval width
pub const CLUSTER_SPREAD: f64 = 0.05;
/// Distance kept between cluster centers and each interval edge
pub const CLUSTER_MARGIN: f64 = 0.1;
/// Upper bound on the number of clusters
pub const MAX_CLUSTERS: usize = 3;

/// Closed time interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateInterval {
    /// Create an interval; `start` must not be after `end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            start <= end,
            "date interval start ({}) is after end ({})",
            start.to_rfc3339(),
            end.to_rfc3339()
        );
        Ok(Self { start, end })
    }

    /// Zero-width interval at a single instant
    pub fn instant(at: DateTime<Utc>) -> Self {
        Self { start: at, end: at }
    }

    /// One calendar year ending at `now`
    pub fn last_year(now: DateTime<Utc>) -> Self {
        let start = now
            .checked_sub_months(Months::new(12))
            .unwrap_or(now - TimeDelta::days(365));
        Self { start, end: now }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Width in whole milliseconds
    pub fn width_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// Instant at `offset_ms` past the start, floored and clamped into range
    fn at_offset(&self, offset_ms: f64) -> DateTime<Utc> {
        let width = self.width_ms();
        let offset = (offset_ms.floor() as i64).clamp(0, width);
        self.start + TimeDelta::milliseconds(offset)
    }
}

/// How observation dates are spread over the interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    /// Even coverage
    #[default]
    Uniform,
    /// Most observations near the end of the interval
    #[serde(alias = "recent", alias = "recent-weighted")]
    RecentWeighted,
    /// Episodic bursts around a few visit dates
    #[serde(alias = "episodic")]
    Clustered,
}

impl std::str::FromStr for DistributionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "uniform" => Ok(DistributionMode::Uniform),
            "recent_weighted" | "recent" => Ok(DistributionMode::RecentWeighted),
            "clustered" | "episodic" => Ok(DistributionMode::Clustered),
            _ => Err(format!(
                "Unknown distribution: {}. Valid options: uniform, recent_weighted, clustered",
                s
            )),
        }
    }
}

impl std::fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionMode::Uniform => write!(f, "uniform"),
            DistributionMode::RecentWeighted => write!(f, "recent_weighted"),
            DistributionMode::Clustered => write!(f, "clustered"),
        }
    }
}

/// Generate `count` dates within `interval`, most recent first.
///
/// `count == 0` returns an empty list without drawing. Draw order per mode:
/// - uniform: one draw per segment, oldest segment first
/// - recent_weighted: one draw per date
/// - clustered: one draw per center, then per date one draw for the center
///   and two (or more, if `u1` is exactly zero) for the Gaussian offset
pub fn generate_dates(
    count: usize,
    interval: &DateInterval,
    rng: &mut SeededRandom,
    mode: DistributionMode,
) -> Vec<DateTime<Utc>> {
    if count == 0 {
        return Vec::new();
    }

    let mut dates = match mode {
        DistributionMode::Uniform => uniform(count, interval, rng),
        DistributionMode::RecentWeighted => recent_weighted(count, interval, rng),
        DistributionMode::Clustered => clustered(count, interval, rng),
    };

    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates
}

fn uniform(count: usize, interval: &DateInterval, rng: &mut SeededRandom) -> Vec<DateTime<Utc>> {
    let width = interval.width_ms() as f64;
    if count == 1 {
        return vec![interval.at_offset(rng.next_f64() * width)];
    }

    let segment = width / count as f64;
    (0..count)
        .map(|i| {
            let segment_start = i as f64 * segment;
            interval.at_offset(segment_start + rng.next_f64() * segment * UNIFORM_JITTER)
        })
        .collect()
}

fn recent_weighted(
    count: usize,
    interval: &DateInterval,
    rng: &mut SeededRandom,
) -> Vec<DateTime<Utc>> {
    let width = interval.width_ms() as f64;
    (0..count)
        .map(|_| {
            let weighted = rng.next_f64().powf(1.0 / RECENCY_DECAY);
            interval.at_offset(weighted * width)
        })
        .collect()
}

/// Number of episode centers for `count` observations
pub fn cluster_count(count: usize) -> usize {
    count.div_ceil(3).clamp(1, MAX_CLUSTERS)
}

fn clustered(count: usize, interval: &DateInterval, rng: &mut SeededRandom) -> Vec<DateTime<Utc>> {
    let width = interval.width_ms() as f64;
    let margin = width * CLUSTER_MARGIN;
    let spread = width * CLUSTER_SPREAD;

    let centers: Vec<f64> = (0..cluster_count(count))
        .map(|_| margin + rng.next_f64() * (width - 2.0 * margin))
        .collect();

    (0..count)
        .map(|_| {
            let center = centers[rng.index(centers.len())];
            let offset = standard_normal(rng) * spread;
            interval.at_offset((center + offset).clamp(0.0, width))
        })
        .collect()
}

/// Box–Muller transform (cosine branch)
fn standard_normal(rng: &mut SeededRandom) -> f64 {
    let mut u1 = rng.next_f64();
    while u1 == 0.0 {
        u1 = rng.next_f64();
    }
    let u2 = rng.next_f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
