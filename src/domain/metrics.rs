//! Summary statistics for the two value trajectories.

use crate::domain::backtest::BacktestResult;
use crate::domain::strategy::TrendSignal;

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryStats {
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
}

impl TrajectoryStats {
    pub fn compute(values: &[f64], periods_per_year: f64) -> Self {
        let initial = values.first().copied().unwrap_or(0.0);
        let final_value = values.last().copied().unwrap_or(initial);

        let total_return = if initial > 0.0 {
            (final_value - initial) / initial
        } else {
            0.0
        };

        // n values span n-1 periods
        let years = values.len().saturating_sub(1) as f64 / periods_per_year;
        let annualized_return = if years > 0.0 && total_return.is_finite() && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        Self {
            final_value,
            total_return,
            annualized_return,
            max_drawdown: compute_max_drawdown(values),
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn compute_max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (peak - v) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub passive: TrajectoryStats,
    pub strategy: TrajectoryStats,
    pub uptrend_steps: usize,
    pub downtrend_steps: usize,
    pub mixed_steps: usize,
}

impl Summary {
    /// Step counts cover rows 1.. since row 0 carries no update.
    pub fn compute(result: &BacktestResult) -> Self {
        let periods_per_year = result.interval.periods_per_year();
        let steps = result.signals.iter().skip(1);
        let count = |signal: TrendSignal| steps.clone().filter(|&&s| s == signal).count();

        Self {
            passive: TrajectoryStats::compute(&result.investment_value, periods_per_year),
            strategy: TrajectoryStats::compute(&result.strategy_value, periods_per_year),
            uptrend_steps: count(TrendSignal::Uptrend),
            downtrend_steps: count(TrendSignal::Downtrend),
            mixed_steps: count(TrendSignal::Mixed),
        }
    }

    /// Fraction of steps the strategy stayed invested.
    pub fn exposure(&self) -> f64 {
        let total = self.uptrend_steps + self.downtrend_steps + self.mixed_steps;
        if total == 0 {
            return 0.0;
        }
        (self.uptrend_steps + self.mixed_steps) as f64 / total as f64
    }
}
