//! Period-over-period fractional change of the close.

/// `pct[0] = 0`, `pct[i] = close[i]/close[i-1] - 1`. A ratio that is not
/// finite (zero or missing prior close) is recorded as 0.
pub fn calculate_pct_change(closes: &[f64]) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }

    std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| {
            let change = w[1] / w[0] - 1.0;
            if change.is_finite() { change } else { 0.0 }
        }))
        .collect()
}
