//! Lookback window and sampling interval labels.
//!
//! Accepts the short tokens used by market data vendors (`5y`, `6mo`, `1wk`,
//! `ytd`, `max`) and spelled-out forms (`5 years`, `1 day`).

use crate::domain::error::BacktestError;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

fn parse_unit(unit: &str) -> Option<Unit> {
    match unit {
        "d" | "day" | "days" => Some(Unit::Day),
        "wk" | "w" | "week" | "weeks" => Some(Unit::Week),
        "mo" | "month" | "months" => Some(Unit::Month),
        "y" | "yr" | "year" | "years" => Some(Unit::Year),
        _ => None,
    }
}

/// Splits `"5y"` / `"5 years"` into a positive count and a unit.
fn parse_count_unit(label: &str) -> Option<(u32, Unit)> {
    let label = label.trim().to_lowercase();
    let split = label.find(|c: char| !c.is_ascii_digit())?;
    let (count, unit) = label.split_at(split);
    let count: u32 = count.parse().ok()?;
    if count == 0 {
        return None;
    }
    Some((count, parse_unit(unit.trim())?))
}

impl Lookback {
    pub fn parse(label: &str) -> Result<Self, BacktestError> {
        match label.trim().to_lowercase().as_str() {
            "max" => return Ok(Lookback::Max),
            "ytd" => return Ok(Lookback::YearToDate),
            _ => {}
        }
        match parse_count_unit(label) {
            Some((n, Unit::Day)) => Ok(Lookback::Days(n)),
            Some((n, Unit::Week)) => Ok(Lookback::Weeks(n)),
            Some((n, Unit::Month)) => Ok(Lookback::Months(n)),
            Some((n, Unit::Year)) => Ok(Lookback::Years(n)),
            None => Err(BacktestError::UnsupportedPeriod {
                label: label.to_string(),
            }),
        }
    }

    /// First date inside the window ending at `end`, or `None` when the
    /// window is unbounded.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Lookback::Days(n) => end.checked_sub_days(Days::new(u64::from(n))),
            Lookback::Weeks(n) => end.checked_sub_days(Days::new(7 * u64::from(n))),
            Lookback::Months(n) => end.checked_sub_months(Months::new(n)),
            Lookback::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Lookback::YearToDate => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Lookback::Max => None,
        }
    }
}

impl Interval {
    pub fn parse(label: &str) -> Result<Self, BacktestError> {
        match parse_count_unit(label) {
            Some((1, Unit::Day)) => Ok(Interval::Daily),
            Some((1, Unit::Week)) => Ok(Interval::Weekly),
            Some((1, Unit::Month)) => Ok(Interval::Monthly),
            _ => Err(BacktestError::UnsupportedInterval {
                label: label.to_string(),
            }),
        }
    }

    /// Bars per year, used to annualize returns.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Interval::Daily => 252.0,
            Interval::Weekly => 52.0,
            Interval::Monthly => 12.0,
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Weeks(n) => write!(f, "{}wk", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::YearToDate => write!(f, "ytd"),
            Lookback::Max => write!(f, "max"),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => write!(f, "1d"),
            Interval::Weekly => write!(f, "1wk"),
            Interval::Monthly => write!(f, "1mo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_short_tokens() {
        assert_eq!(Lookback::parse("5y").unwrap(), Lookback::Years(5));
        assert_eq!(Lookback::parse("6mo").unwrap(), Lookback::Months(6));
        assert_eq!(Lookback::parse("5d").unwrap(), Lookback::Days(5));
        assert_eq!(Lookback::parse("2wk").unwrap(), Lookback::Weeks(2));
        assert_eq!(Lookback::parse("ytd").unwrap(), Lookback::YearToDate);
        assert_eq!(Lookback::parse("MAX").unwrap(), Lookback::Max);
    }

    #[test]
    fn parse_spelled_out() {
        assert_eq!(Lookback::parse("5 years").unwrap(), Lookback::Years(5));
        assert_eq!(Lookback::parse("30 days").unwrap(), Lookback::Days(30));
        assert_eq!(Lookback::parse(" 1 Year ").unwrap(), Lookback::Years(1));
    }

    #[test]
    fn parse_rejects_garbage() {
        for label in ["", "y", "0y", "5 fortnights", "-3y", "1h"] {
            let err = Lookback::parse(label).unwrap_err();
            assert!(matches!(err, BacktestError::UnsupportedPeriod { .. }), "{label}");
        }
    }

    #[test]
    fn start_date_windows() {
        let end = date(2024, 3, 31);
        assert_eq!(Lookback::Days(30).start_date(end), Some(date(2024, 3, 1)));
        assert_eq!(Lookback::Weeks(1).start_date(end), Some(date(2024, 3, 24)));
        assert_eq!(Lookback::Months(1).start_date(end), Some(date(2024, 2, 29)));
        assert_eq!(Lookback::Years(5).start_date(end), Some(date(2019, 3, 31)));
        assert_eq!(Lookback::YearToDate.start_date(end), Some(date(2024, 1, 1)));
        assert_eq!(Lookback::Max.start_date(end), None);
    }

    #[test]
    fn interval_labels() {
        assert_eq!(Interval::parse("1d").unwrap(), Interval::Daily);
        assert_eq!(Interval::parse("1 day").unwrap(), Interval::Daily);
        assert_eq!(Interval::parse("1wk").unwrap(), Interval::Weekly);
        assert_eq!(Interval::parse("1 month").unwrap(), Interval::Monthly);
    }

    #[test]
    fn interval_rejects_unsupported() {
        for label in ["1h", "5m", "2d", "3mo", "daily"] {
            let err = Interval::parse(label).unwrap_err();
            assert!(matches!(err, BacktestError::UnsupportedInterval { .. }), "{label}");
        }
    }

    #[test]
    fn display_round_trips_labels() {
        assert_eq!(Lookback::Years(5).to_string(), "5y");
        assert_eq!(Interval::Weekly.to_string(), "1wk");
        assert_eq!(Lookback::parse(&Lookback::Months(3).to_string()).unwrap(), Lookback::Months(3));
    }
}
