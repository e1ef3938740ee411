//! Backtest pipeline and its output table.
//!
//! `run_backtest` checks every precondition, then derives the EMA, return,
//! passive valuation and strategy columns from one price series. The result
//! is columnar; every column has one entry per bar.

use crate::domain::error::BacktestError;
use crate::domain::indicator::ema::compute_emas;
use crate::domain::indicator::pct_change::calculate_pct_change;
use crate::domain::indicator::{DEFAULT_SPANS, EmaColumns, IndicatorType};
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::domain::period::{Interval, Lookback};
use crate::domain::strategy::{StrategyConfig, TrendSignal, classify_trends, simulate_strategy};
use crate::domain::valuation::{calculate_valuation, validate_investment};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub period: Lookback,
    pub interval: Interval,
    pub spans: Vec<usize>,
    pub initial_investment: f64,
    pub reverse: bool,
}

impl BacktestConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: Lookback::Years(5),
            interval: Interval::Daily,
            spans: DEFAULT_SPANS.to_vec(),
            initial_investment: 1000.0,
            reverse: false,
        }
    }

    pub fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            initial_investment: self.initial_investment,
            reverse: self.reverse,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub interval: Interval,
    pub initial_investment: f64,
    pub bars: Vec<OhlcvBar>,
    pub emas: EmaColumns,
    pub pct_change: Vec<f64>,
    pub signals: Vec<TrendSignal>,
    pub investment_value: Vec<f64>,
    pub strategy_value: Vec<f64>,
}

impl BacktestResult {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.extend(self.emas.spans().map(|s| IndicatorType::Ema(s).to_string()));
        names.push(IndicatorType::PctChange.to_string());
        names.extend(
            ["trend", "investment_value", "strategy_value"]
                .iter()
                .map(|s| s.to_string()),
        );
        names
    }

    /// Row `i` as strings, in `column_names` order.
    pub fn row(&self, i: usize) -> Vec<String> {
        let bar = &self.bars[i];
        let mut row = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        row.extend(self.emas.iter().map(|(_, values)| values[i].to_string()));
        row.push(self.pct_change[i].to_string());
        row.push(self.signals[i].to_string());
        row.push(format!("{:.2}", self.investment_value[i]));
        row.push(format!("{:.2}", self.strategy_value[i]));
        row
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.len()).map(|i| self.row(i))
    }
}

fn validate_spans(spans: &[usize]) -> Result<(), BacktestError> {
    if let Some(&span) = spans.iter().find(|&&s| s == 0) {
        return Err(BacktestError::InvalidSpan { span });
    }
    if let Some(span) = DEFAULT_SPANS.into_iter().find(|s| !spans.contains(s)) {
        return Err(BacktestError::MissingEma { span });
    }
    Ok(())
}

pub fn run_backtest(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, BacktestError> {
    if series.is_empty() {
        return Err(BacktestError::EmptySeries);
    }
    validate_investment(config.initial_investment)?;
    validate_spans(&config.spans)?;

    info!(
        symbol = series.symbol(),
        bars = series.len(),
        spans = ?config.spans,
        "running backtest"
    );

    let closes = series.closes();
    let emas = compute_emas(&closes, &config.spans)?;
    let pct_change = calculate_pct_change(&closes);
    let signals = classify_trends(&emas, closes.len())?;
    let investment_value = calculate_valuation(&pct_change, config.initial_investment)?;
    let strategy_value = simulate_strategy(&emas, &pct_change, &config.strategy_config())?;

    Ok(BacktestResult {
        symbol: series.symbol().to_string(),
        interval: config.interval,
        initial_investment: config.initial_investment,
        bars: series.bars().to_vec(),
        emas,
        pct_change,
        signals,
        investment_value,
        strategy_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10,
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::new("AAPL");
        assert_eq!(c.symbol, "AAPL");
        assert_eq!(c.period, Lookback::Years(5));
        assert_eq!(c.interval, Interval::Daily);
        assert_eq!(c.spans, vec![20, 50, 100, 200]);
        assert_eq!(c.initial_investment, 1000.0);
        assert!(!c.reverse);
    }

    #[test]
    fn known_scenario_columns() {
        let result = run_backtest(&series(&[100.0, 110.0, 99.0, 99.0]), &BacktestConfig::new("TEST")).unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.investment_value, vec![1000.0, 1100.0, 990.0, 990.0]);
        // rising then falling closes never produce a strict descending stack
        assert_eq!(result.strategy_value, result.investment_value);
        assert_eq!(result.signals[0], TrendSignal::Mixed);
        assert_eq!(result.signals[1], TrendSignal::Uptrend);
    }

    #[test]
    fn every_column_is_aligned() {
        let result = run_backtest(&series(&[5.0, 6.0, 4.0, 7.0, 7.5]), &BacktestConfig::new("TEST")).unwrap();
        let n = result.len();
        assert_eq!(result.pct_change.len(), n);
        assert_eq!(result.signals.len(), n);
        assert_eq!(result.investment_value.len(), n);
        assert_eq!(result.strategy_value.len(), n);
        assert!(result.emas.iter().all(|(_, v)| v.len() == n));
    }

    #[test]
    fn single_bar() {
        let result = run_backtest(&series(&[42.0]), &BacktestConfig::new("TEST")).unwrap();
        assert_eq!(result.pct_change, vec![0.0]);
        assert_eq!(result.investment_value, vec![1000.0]);
        assert_eq!(result.strategy_value, vec![1000.0]);
    }

    #[test]
    fn empty_series_rejected() {
        let err = run_backtest(&series(&[]), &BacktestConfig::new("TEST")).unwrap_err();
        assert!(matches!(err, BacktestError::EmptySeries));
    }

    #[test]
    fn missing_required_span_rejected() {
        let config = BacktestConfig {
            spans: vec![20, 50, 100],
            ..BacktestConfig::new("TEST")
        };
        let err = run_backtest(&series(&[1.0, 2.0]), &config).unwrap_err();
        assert!(matches!(err, BacktestError::MissingEma { span: 200 }));
    }

    #[test]
    fn zero_span_rejected() {
        let config = BacktestConfig {
            spans: vec![0, 20, 50, 100, 200],
            ..BacktestConfig::new("TEST")
        };
        let err = run_backtest(&series(&[1.0, 2.0]), &config).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidSpan { span: 0 }));
    }

    #[test]
    fn extra_spans_become_columns() {
        let config = BacktestConfig {
            spans: vec![10, 20, 50, 100, 200],
            ..BacktestConfig::new("TEST")
        };
        let result = run_backtest(&series(&[1.0, 2.0]), &config).unwrap();
        assert_eq!(
            result.column_names(),
            vec![
                "date", "open", "high", "low", "close", "volume", "EMA_10", "EMA_20", "EMA_50",
                "EMA_100", "EMA_200", "pct_change", "trend", "investment_value", "strategy_value"
            ]
        );
    }

    #[test]
    fn negative_investment_rejected() {
        let config = BacktestConfig {
            initial_investment: -1.0,
            ..BacktestConfig::new("TEST")
        };
        let err = run_backtest(&series(&[1.0]), &config).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidInvestment { .. }));
    }

    #[test]
    fn row_formats_values() {
        let result = run_backtest(&series(&[100.0, 110.0]), &BacktestConfig::new("TEST")).unwrap();
        let row = result.row(1);
        assert_eq!(row.len(), result.column_names().len());
        assert_eq!(row[0], "2024-01-02");
        assert_eq!(row[4], "110");
        assert_eq!(row[row.len() - 3], "uptrend");
        assert_eq!(row[row.len() - 2], "1100.00");
        assert_eq!(row[row.len() - 1], "1100.00");
    }

    #[test]
    fn rerun_is_identical() {
        let s = series(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let config = BacktestConfig::new("TEST");
        assert_eq!(run_backtest(&s, &config).unwrap(), run_backtest(&s, &config).unwrap());
    }
}
