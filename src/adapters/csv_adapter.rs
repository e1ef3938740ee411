//! CSV file price source.
//!
//! Reads `<SYMBOL>.csv` files with a `date,open,high,low,close,volume` header
//! and daily rows. Weekly and monthly intervals are built by resampling.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::{Interval, Lookback};
use crate::domain::resample::resample;
use crate::ports::data_port::PriceSeriesSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BacktestError> {
        let path = self.csv_path(symbol);
        if !path.is_file() {
            return Err(BacktestError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| BacktestError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            let row = line + 2;

            let date_str = field(&record, 0, "date", row)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BacktestError::DataSource {
                    reason: format!("row {}: invalid date '{}': {}", row, date_str, e),
                }
            })?;

            bars.push(OhlcvBar {
                date,
                open: parse_price(&record, 1, "open", row)?,
                high: parse_price(&record, 2, "high", row)?,
                low: parse_price(&record, 3, "low", row)?,
                close: parse_price(&record, 4, "close", row)?,
                volume: parse_field(&record, 5, "volume", row)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'r str, BacktestError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| BacktestError::DataSource {
            reason: format!("row {}: missing {} column", row, name),
        })
}

fn parse_field<T>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<T, BacktestError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = field(record, index, name, row)?;
    raw.parse().map_err(|e| BacktestError::DataSource {
        reason: format!("row {}: invalid {} value '{}': {}", row, name, raw, e),
    })
}

/// `f64::from_str` accepts `NaN` and `inf`; a price must be finite.
fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, BacktestError> {
    let value: f64 = parse_field(record, index, name, row)?;
    if !value.is_finite() {
        return Err(BacktestError::DataSource {
            reason: format!("row {}: non-finite {} value '{}'", row, name, value),
        });
    }
    Ok(value)
}

impl PriceSeriesSource for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        period: Lookback,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, BacktestError> {
        let bars = self.read_bars(symbol)?;

        let start = bars.last().and_then(|last| period.start_date(last.date));
        let windowed: Vec<OhlcvBar> = match start {
            Some(start) => bars.into_iter().filter(|b| b.date >= start).collect(),
            None => bars,
        };

        debug!(
            symbol,
            %period,
            %interval,
            rows = windowed.len(),
            "loaded price history"
        );
        Ok(resample(&windowed, interval))
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BacktestError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacktestError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
