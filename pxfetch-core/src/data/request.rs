//! History request: symbol, date window and lookback period.
//!
//! Explicit dates win over the period. With neither bound given the provider
//! is asked for the period directly; with only one bound the other is filled
//! in (`end` = tomorrow, `start` = `end` minus the period).
//!
//! `end` is exclusive: a request for 2024-05-13..2024-05-17 returns the 13th
//! through the 16th.

use super::provider::DataError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback period accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
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
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    /// The provider's spelling of this period (`1mo`, `ytd`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// First day of this period when it ends on `end`.
    pub fn start_for(&self, end: NaiveDate) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
        let months = |n: u32| end.checked_sub_months(Months::new(n)).unwrap_or(epoch);
        match self {
            Period::OneDay => end.checked_sub_days(Days::new(1)).unwrap_or(epoch),
            Period::FiveDays => end.checked_sub_days(Days::new(5)).unwrap_or(epoch),
            Period::OneMonth => months(1),
            Period::ThreeMonths => months(3),
            Period::SixMonths => months(6),
            Period::OneYear => months(12),
            Period::TwoYears => months(24),
            Period::FiveYears => months(60),
            Period::TenYears => months(120),
            Period::YearToDate => NaiveDate::from_ymd_opt(end.year(), 1, 1).unwrap_or(epoch),
            Period::Max => epoch,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Period::ALL.iter().map(|p| p.as_str()).collect();
                DataError::InvalidRequest(format!(
                    "unknown period '{s}'. Valid: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// The date window a provider should be queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Explicit date range, `start` inclusive and `end` exclusive.
    Range { start: NaiveDate, end: NaiveDate },
    /// Let the provider resolve a lookback period ending today.
    Lookback(Period),
}

/// A request for one symbol's daily history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub period: Period,
}

impl HistoryRequest {
    /// Build a request for `symbol` with the default period.
    ///
    /// The symbol is trimmed and upper-cased. Only ASCII letters, digits and
    /// `. - ^ = _` are accepted, so the symbol is safe both as a URL path
    /// segment and as a file name.
    pub fn new(symbol: &str) -> Result<Self, DataError> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(DataError::InvalidRequest("symbol must not be empty".into()));
        }
        if let Some(bad) = symbol.chars().find(|c| !is_symbol_char(*c)) {
            return Err(DataError::InvalidRequest(format!(
                "symbol '{symbol}' contains invalid character '{bad}'"
            )));
        }
        if symbol.chars().all(|c| c == '.') {
            return Err(DataError::InvalidRequest(format!(
                "symbol '{symbol}' is not a ticker"
            )));
        }
        Ok(Self {
            symbol,
            start: None,
            end: None,
            period: Period::default(),
        })
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    /// Resolve the window to query. A missing `end` means "through `today`".
    pub fn window(&self, today: NaiveDate) -> Result<Window, DataError> {
        if self.start.is_none() && self.end.is_none() {
            return Ok(Window::Lookback(self.period));
        }

        let end = self.end.unwrap_or_else(|| day_after(today));
        let start = self.start.unwrap_or_else(|| self.period.start_for(end));
        if start >= end {
            return Err(DataError::InvalidRequest(format!(
                "start date {start} must be before end date {end} (end is exclusive)"
            )));
        }
        Ok(Window::Range { start, end })
    }

    /// Resolve the window into concrete `[start, end)` dates, expanding a
    /// lookback so that it covers `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), DataError> {
        match self.window(today)? {
            Window::Range { start, end } => Ok((start, end)),
            Window::Lookback(period) => Ok((period.start_for(today), day_after(today))),
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_')
}

fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
