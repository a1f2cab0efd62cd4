//! `targetgrid-fiscal` - fiscal calendar model.
//!
//! The fiscal year begins September 1 and is labeled by its starting
//! calendar year: September 2025 through August 2026 is fiscal 2025.
//! Every period is addressed by the canonical calendar-date key
//! `"YYYY-MM-01"`; that string is the only period representation that
//! crosses the wire.
//!
//! Pure crate: no IO, no network.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// First month of the fiscal year (September).
pub const FISCAL_START_MONTH: u32 = 9;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// Month outside 1..=12.
    InvalidMonth(u32),
    /// Quarter outside 1..=4.
    InvalidQuarter(u8),
    /// Period key is not a `YYYY-MM-01` date.
    BadKey(String),
}

impl std::fmt::Display for PeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMonth(m) => write!(f, "invalid month: {m}"),
            Self::InvalidQuarter(q) => write!(f, "invalid quarter: {q}"),
            Self::BadKey(key) => write!(f, "bad period key: {key:?}"),
        }
    }
}

impl std::error::Error for PeriodError {}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Fiscal year containing the given calendar month.
/// September onward belongs to the fiscal year starting that September.
pub fn fiscal_year_of(calendar_year: i32, month: u32) -> Result<i32, PeriodError> {
    check_month(month)?;
    Ok(if month >= FISCAL_START_MONTH {
        calendar_year
    } else {
        calendar_year - 1
    })
}

/// Fiscal quarter of a calendar month: {9,10,11} Q1, {12,1,2} Q2,
/// {3,4,5} Q3, {6,7,8} Q4.
pub fn quarter_of(month: u32) -> Result<u8, PeriodError> {
    check_month(month)?;
    Ok(match month {
        9 | 10 | 11 => 1,
        12 | 1 | 2 => 2,
        3 | 4 | 5 => 3,
        _ => 4,
    })
}

/// The month used to key a quarter when a single representative period is
/// needed: Q1 -> 9, Q2 -> 12, Q3 -> 3, Q4 -> 6 (each quarter's opening
/// month).
pub fn quarter_opening_month(quarter: u8) -> Result<u32, PeriodError> {
    match quarter {
        1 => Ok(9),
        2 => Ok(12),
        3 => Ok(3),
        4 => Ok(6),
        q => Err(PeriodError::InvalidQuarter(q)),
    }
}

/// Canonical period key for a month of a fiscal year.
/// September through December fall in the fiscal year's starting calendar
/// year; January through August in the following one.
pub fn period_key(fiscal_year: i32, month: u32) -> Result<String, PeriodError> {
    check_month(month)?;
    let calendar_year = if month >= FISCAL_START_MONTH {
        fiscal_year
    } else {
        fiscal_year + 1
    };
    Ok(format!("{calendar_year:04}-{month:02}-01"))
}

/// Parse a canonical `"YYYY-MM-01"` key back into a [`FiscalPeriod`].
/// Keys whose day component is not `01` are rejected.
pub fn parse_period_key(key: &str) -> Result<FiscalPeriod, PeriodError> {
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|_| PeriodError::BadKey(key.to_string()))?;
    if date.day() != 1 {
        return Err(PeriodError::BadKey(key.to_string()));
    }
    FiscalPeriod::from_calendar(date.year(), date.month())
}

/// The 12 period keys of a fiscal year, September of `fiscal_year` through
/// August of `fiscal_year + 1`, strictly increasing.
pub fn fiscal_year_months(fiscal_year: i32) -> Vec<String> {
    (0..12)
        .map(|offset| {
            let month = (FISCAL_START_MONTH - 1 + offset) % 12 + 1;
            let calendar_year = if month >= FISCAL_START_MONTH {
                fiscal_year
            } else {
                fiscal_year + 1
            };
            format!("{calendar_year:04}-{month:02}-01")
        })
        .collect()
}

/// Selectable fiscal years for a period picker: ascending, from
/// `current - span` through `current + 1` (bounded history plus the next
/// planning year).
pub fn year_options(current_fiscal_year: i32, span: u32) -> Vec<i32> {
    (current_fiscal_year - span as i32..=current_fiscal_year + 1).collect()
}

fn check_month(month: u32) -> Result<(), PeriodError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(PeriodError::InvalidMonth(month))
    }
}

// ---------------------------------------------------------------------------
// FiscalPeriod
// ---------------------------------------------------------------------------

/// One month viewed through both calendars at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub fiscal_year: i32,
    pub calendar_year: i32,
    /// Calendar month, 1..=12.
    pub month: u32,
    /// Fiscal quarter, 1..=4.
    pub quarter: u8,
}

impl FiscalPeriod {
    /// Build from a calendar year/month pair.
    pub fn from_calendar(calendar_year: i32, month: u32) -> Result<Self, PeriodError> {
        let fiscal_year = fiscal_year_of(calendar_year, month)?;
        let quarter = quarter_of(month)?;
        Ok(Self { fiscal_year, calendar_year, month, quarter })
    }

    /// Build from a fiscal year/month pair.
    pub fn from_fiscal(fiscal_year: i32, month: u32) -> Result<Self, PeriodError> {
        check_month(month)?;
        let calendar_year = if month >= FISCAL_START_MONTH {
            fiscal_year
        } else {
            fiscal_year + 1
        };
        Self::from_calendar(calendar_year, month)
    }

    /// Canonical `"YYYY-MM-01"` key.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}-01", self.calendar_year, self.month)
    }

    /// First day of the period as a calendar date.
    pub fn date(&self) -> NaiveDate {
        // Month is validated at construction, so the date always exists.
        NaiveDate::from_ymd_opt(self.calendar_year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
