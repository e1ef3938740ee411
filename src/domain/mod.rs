//! Core domain types and logic.

pub mod ohlcv;
pub mod period;
pub mod resample;
pub mod indicator;
pub mod valuation;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
