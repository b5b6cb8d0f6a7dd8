//! Bar granularity and history period.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Bar granularity.
///
/// Serialized with the provider-style short codes (`1h`, `4h`, `1d`, `1wk`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHour,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneHour => "1h",
            Interval::FourHour => "4h",
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }

    /// Nominal bar width.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::OneHour => Duration::hours(1),
            Interval::FourHour => Duration::hours(4),
            Interval::Daily => Duration::days(1),
            Interval::Weekly => Duration::weeks(1),
        }
    }

    pub fn is_intraday(&self) -> bool {
        matches!(self, Interval::OneHour | Interval::FourHour)
    }

    /// The finer interval this one is built from when a provider lacks it natively.
    pub fn resample_source(&self) -> Option<Interval> {
        match self {
            Interval::FourHour => Some(Interval::OneHour),
            _ => None,
        }
    }

    /// Start of the bucket containing `ts`.
    ///
    /// Buckets are aligned to the Unix epoch; weekly buckets start on Monday 00:00.
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let secs = ts.and_utc().timestamp();
        let width = self.duration().num_seconds();
        // 1970-01-01 was a Thursday: shift by three days so weeks start on Monday.
        let offset = if *self == Interval::Weekly {
            3 * 86_400
        } else {
            0
        };
        let start = secs - (secs + offset).rem_euclid(width);
        chrono::DateTime::from_timestamp(start, 0)
            .map(|dt| dt.naive_utc())
            .unwrap_or(ts)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" | "60m" | "hourly" => Ok(Interval::OneHour),
            "4h" | "240m" => Ok(Interval::FourHour),
            "1d" | "daily" => Ok(Interval::Daily),
            "1wk" | "1w" | "weekly" => Ok(Interval::Weekly),
            other => Err(CoreError::invalid(format!("unknown interval '{other}'"))),
        }
    }
}

/// How much history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Approximate calendar span, used by the synthetic provider.
    pub fn approx_days(&self) -> i64 {
        match self {
            Period::OneMonth => 30,
            Period::ThreeMonths => 91,
            Period::SixMonths => 182,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1826,
            Period::Max => 3652,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "max" => Ok(Period::Max),
            other => Err(CoreError::invalid(format!("unknown period '{other}'"))),
        }
    }
}
