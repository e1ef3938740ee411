//! EMA-ordering strategy simulation.
//!
//! Each step classifies the EMA snapshot into a [`TrendSignal`] and applies
//! the matching update to the previous strategy value:
//!
//! - `Uptrend`   (EMA_20 > EMA_50 > EMA_100 > EMA_200): compound with the period return
//! - `Downtrend` (EMA_20 < EMA_50 < EMA_100 < EMA_200): hold the previous value
//! - `Mixed`     (anything else, equality included): compound with the period return
//!
//! The signal reads only the current snapshot; the value carries forward.

use crate::domain::error::BacktestError;
use crate::domain::indicator::{DEFAULT_SPANS, EmaColumns, IndicatorType};
use crate::domain::valuation::{compound, round_cents, validate_investment};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendSignal {
    Uptrend,
    Downtrend,
    Mixed,
}

impl TrendSignal {
    /// Classifies EMA values ordered fastest span first. Strict on every
    /// adjacent pair; NaN compares false and lands in `Mixed`.
    pub fn classify(emas: &[f64]) -> Self {
        if emas.windows(2).all(|w| w[0] > w[1]) {
            TrendSignal::Uptrend
        } else if emas.windows(2).all(|w| w[0] < w[1]) {
            TrendSignal::Downtrend
        } else {
            TrendSignal::Mixed
        }
    }

    /// Value after one period under this signal.
    pub fn apply(self, prev: f64, pct: f64) -> f64 {
        match self {
            TrendSignal::Uptrend | TrendSignal::Mixed => compound(prev, pct),
            TrendSignal::Downtrend => round_cents(prev),
        }
    }
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendSignal::Uptrend => write!(f, "uptrend"),
            TrendSignal::Downtrend => write!(f, "downtrend"),
            TrendSignal::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub initial_investment: f64,
    /// Reserved for an inverse variant. Accepted and ignored.
    pub reverse: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial_investment: 1000.0,
            reverse: false,
        }
    }
}

fn required_column(emas: &EmaColumns, span: usize, len: usize) -> Result<&[f64], BacktestError> {
    let column = emas.get(span).ok_or(BacktestError::MissingEma { span })?;
    if column.len() != len {
        return Err(BacktestError::length_mismatch(
            IndicatorType::Ema(span).to_string(),
            len,
            column.len(),
        ));
    }
    Ok(column)
}

/// The four required EMA columns, fastest first, checked against `len`.
fn required_columns(emas: &EmaColumns, len: usize) -> Result<[&[f64]; 4], BacktestError> {
    let [fast, mid, slow, slowest] = DEFAULT_SPANS;
    Ok([
        required_column(emas, fast, len)?,
        required_column(emas, mid, len)?,
        required_column(emas, slow, len)?,
        required_column(emas, slowest, len)?,
    ])
}

/// Trend signal for every row.
pub fn classify_trends(emas: &EmaColumns, len: usize) -> Result<Vec<TrendSignal>, BacktestError> {
    let [e20, e50, e100, e200] = required_columns(emas, len)?;
    Ok((0..len)
        .map(|i| TrendSignal::classify(&[e20[i], e50[i], e100[i], e200[i]]))
        .collect())
}

/// Strategy value trajectory. All preconditions are checked before the first
/// step; the recurrence itself cannot fail.
pub fn simulate_strategy(
    emas: &EmaColumns,
    pct: &[f64],
    config: &StrategyConfig,
) -> Result<Vec<f64>, BacktestError> {
    validate_investment(config.initial_investment)?;
    if pct.is_empty() {
        return Err(BacktestError::EmptySeries);
    }
    let signals = classify_trends(emas, pct.len())?;
    if config.reverse {
        debug!("reverse flag set; no inverse variant exists, running forward strategy");
    }

    let v0 = config.initial_investment;
    let mut values = Vec::with_capacity(pct.len());
    values.push(v0);
    values.extend(signals[1..].iter().zip(&pct[1..]).scan(v0, |value, (signal, &p)| {
        *value = signal.apply(*value, p);
        Some(*value)
    }));
    Ok(values)
}
