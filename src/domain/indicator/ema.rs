//! Exponential Moving Average.
//!
//! alpha = 2/(k+1), seeded with the first close, then
//! EMA[i] = alpha*C[i] + (1-alpha)*EMA[i-1]. Every row is defined; there is no warmup.

use crate::domain::error::BacktestError;
use crate::domain::indicator::EmaColumns;

pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<f64> {
    let Some(&first) = closes.first() else {
        return Vec::new();
    };
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut values = Vec::with_capacity(closes.len());
    values.push(first);
    values.extend(closes[1..].iter().scan(first, |ema, &close| {
        *ema = alpha * close + (1.0 - alpha) * *ema;
        Some(*ema)
    }));
    values
}

/// One EMA column per span. Span 0 has no smoothing factor and is rejected.
pub fn compute_emas(closes: &[f64], spans: &[usize]) -> Result<EmaColumns, BacktestError> {
    let mut columns = EmaColumns::new();
    for &span in spans {
        if span == 0 {
            return Err(BacktestError::InvalidSpan { span });
        }
        columns.insert(span, calculate_ema(closes, span));
    }
    Ok(columns)
}
