//! # Time ranges
//! Closed set of chart look-back windows and the bucketing parameters each one
//! implies.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Look-back window selected for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
}

/// Bucketing parameters for a [`TimeRange`], all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeConfig {
    /// Total look-back window.
    pub duration: i64,
    /// Width of a single bucket.
    pub bucket_size: i64,
    /// Upper bound on buckets retained and rendered.
    pub max_points: usize,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [
        TimeRange::OneMinute,
        TimeRange::ThreeMinutes,
        TimeRange::FiveMinutes,
    ];

    pub fn config(self) -> RangeConfig {
        match self {
            TimeRange::OneMinute => RangeConfig {
                duration: 60 * 1000,
                bucket_size: 1000,
                max_points: 60,
            },
            TimeRange::ThreeMinutes => RangeConfig {
                duration: 3 * 60 * 1000,
                bucket_size: 3000,
                max_points: 60,
            },
            TimeRange::FiveMinutes => RangeConfig {
                duration: 5 * 60 * 1000,
                bucket_size: 5000,
                max_points: 60,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::OneMinute => "1m",
            TimeRange::ThreeMinutes => "3m",
            TimeRange::FiveMinutes => "5m",
        }
    }
}

impl RangeConfig {
    /// Start of the bucket containing `ts_ms`.
    pub fn bucket_start(&self, ts_ms: i64) -> i64 {
        ts_ms.div_euclid(self.bucket_size) * self.bucket_size
    }

    /// Number of points a full render produces.
    pub fn rendered_len(&self) -> usize {
        let steps = (self.duration / self.bucket_size) as usize + 1;
        steps.min(self.max_points)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Ok(TimeRange::OneMinute),
            "3m" => Ok(TimeRange::ThreeMinutes),
            "5m" => Ok(TimeRange::FiveMinutes),
            other => Err(anyhow!("unknown time range '{other}' (expected 1m, 3m or 5m)")),
        }
    }
}
