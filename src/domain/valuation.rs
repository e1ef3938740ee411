//! Passive buy-and-hold valuation trajectory.

use crate::domain::error::BacktestError;

/// Rounds to 2 decimals, ties to even on the scaled value.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// One compounding step: `round(prev * (1 + pct), 2)`.
pub fn compound(prev: f64, pct: f64) -> f64 {
    round_cents(prev * (1.0 + pct))
}

pub fn validate_investment(initial_investment: f64) -> Result<(), BacktestError> {
    if initial_investment > 0.0 && initial_investment.is_finite() {
        Ok(())
    } else {
        Err(BacktestError::InvalidInvestment {
            value: initial_investment,
        })
    }
}

/// `value[0] = V0`, `value[i] = round(value[i-1] * (1 + pct[i]), 2)`.
///
/// Rounding happens at every step, so the result is a left fold over `pct`
/// and not a rounded cumulative product.
pub fn calculate_valuation(pct: &[f64], initial_investment: f64) -> Result<Vec<f64>, BacktestError> {
    validate_investment(initial_investment)?;
    if pct.is_empty() {
        return Err(BacktestError::EmptySeries);
    }

    let mut values = Vec::with_capacity(pct.len());
    values.push(initial_investment);
    values.extend(pct[1..].iter().scan(initial_investment, |value, &p| {
        *value = compound(*value, p);
        Some(*value)
    }));
    Ok(values)
}
