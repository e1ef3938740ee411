//! OHLCV bar representation and the ordered price series.

use crate::domain::error::BacktestError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Bars for one symbol, strictly ascending by date.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl OhlcvBar {
    /// Name of the first price field that is NaN or infinite.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

impl PriceSeries {
    /// Rejects out-of-order or duplicate dates and non-finite prices. An
    /// empty series is allowed; the transforms that need data check for it
    /// themselves.
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, BacktestError> {
        if let Some(pos) = bars.windows(2).position(|w| w[0].date >= w[1].date) {
            return Err(BacktestError::UnorderedSeries { index: pos + 1 });
        }
        if let Some((index, field)) = bars
            .iter()
            .enumerate()
            .find_map(|(i, b)| b.non_finite_field().map(|f| (i, f)))
        {
            return Err(BacktestError::NonFinitePrice { index, field });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
