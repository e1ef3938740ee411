#![allow(dead_code)]

use chrono::NaiveDate;
use emacross::domain::backtest::BacktestResult;
use emacross::domain::error::BacktestError;
pub use emacross::domain::ohlcv::{OhlcvBar, PriceSeries};
use emacross::domain::period::{Interval, Lookback};
use emacross::ports::data_port::PriceSeriesSource;
use emacross::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, Lookback, Interval)>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSeriesSource for MockPriceSource {
    fn fetch_history(
        &self,
        symbol: &str,
        period: Lookback,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, BacktestError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), period, interval));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::DataSource {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| BacktestError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Records what it was asked to write instead of touching the filesystem.
pub struct RecordingReport {
    pub written: RefCell<Vec<(PathBuf, usize)>>,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self {
            written: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReport {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BacktestError> {
        self.written
            .borrow_mut()
            .push((output_path.to_path_buf(), result.len()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars on consecutive calendar days starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST", bars_from_closes(closes)).unwrap()
}

/// Linear ramp of `count` closes from `start` by `step`.
pub fn ramp(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

pub fn csv_content(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
