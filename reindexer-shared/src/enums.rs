//! Closed enumerations backing the string-valued configuration options.
//!
//! Each enum parses once at configuration time via `FromStr` and rejects
//! unknown values with a message naming the accepted ones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration value outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {kind} {value:?}, expected one of: {allowed}")]
pub struct UnsupportedValue {
    /// Which option the value was supplied for.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
    /// The accepted spellings.
    pub allowed: &'static str,
}

impl UnsupportedValue {
    fn new(kind: &'static str, value: &str, allowed: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            allowed,
        }
    }
}

/// Destination date patterns for index partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    /// `YYYYmm`, e.g. `202401`.
    YearMonth,
    /// `YYYYmmdd`, e.g. `20240115`.
    YearMonthDay,
    /// `YYYY-mm-dd`, e.g. `2024-01-15`.
    YearMonthDayDashed,
    /// `ddmmYYYY`, e.g. `15012024`.
    DayMonthYear,
}

impl DateFormat {
    /// The `strftime` pattern used to render a timestamp with this format.
    pub fn strftime(&self) -> &'static str {
        match self {
            Self::YearMonth => "%Y%m",
            Self::YearMonthDay => "%Y%m%d",
            Self::YearMonthDayDashed => "%Y-%m-%d",
            Self::DayMonthYear => "%d%m%Y",
        }
    }

    /// The configuration spelling of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YearMonth => "YYYYmm",
            Self::YearMonthDay => "YYYYmmdd",
            Self::YearMonthDayDashed => "YYYY-mm-dd",
            Self::DayMonthYear => "ddmmYYYY",
        }
    }
}

impl FromStr for DateFormat {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YYYYmm" => Ok(Self::YearMonth),
            "YYYYmmdd" => Ok(Self::YearMonthDay),
            "YYYY-mm-dd" => Ok(Self::YearMonthDayDashed),
            "ddmmYYYY" => Ok(Self::DayMonthYear),
            other => Err(UnsupportedValue::new(
                "date format",
                other,
                "YYYYmm, YYYYmmdd, YYYY-mm-dd, ddmmYYYY",
            )),
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order applied to range scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Oldest documents first.
    #[default]
    Asc,
    /// Newest documents first.
    Desc,
}

impl SortOrder {
    /// The wire spelling of this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnsupportedValue::new("sort order", other, "asc, desc")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How timestamps are represented in the source documents and range bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Date strings are passed through to the engine unconverted; document
    /// timestamps are treated as epoch seconds.
    #[default]
    Raw,
    /// Epoch seconds.
    EpochSeconds,
    /// Epoch milliseconds.
    EpochMillis,
}

impl TimeUnit {
    /// The configuration spelling of this representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::EpochSeconds => "epoch_second",
            Self::EpochMillis => "epoch_millis",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "epoch_second" => Ok(Self::EpochSeconds),
            "epoch_millis" => Ok(Self::EpochMillis),
            other => Err(UnsupportedValue::new(
                "time representation",
                other,
                "raw, epoch_second, epoch_millis",
            )),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
