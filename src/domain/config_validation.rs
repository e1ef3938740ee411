//! Configuration validation.
//!
//! Validates all config fields before any data is read.

use crate::domain::error::BacktestError;
use crate::domain::indicator::DEFAULT_SPANS;
use crate::domain::period::{Interval, Lookback};
use crate::ports::config_port::{ConfigPort, parse_bool};

pub const DEFAULT_PERIOD: &str = "5y";
pub const DEFAULT_INTERVAL: &str = "1d";
pub const DEFAULT_INITIAL_INVESTMENT: f64 = 1000.0;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_symbol(config)?;
    validate_backtest_params(config)
}

/// Everything except the symbol, for callers that supply it separately.
pub fn validate_backtest_params(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_initial_investment(config)?;
    validate_period(config)?;
    validate_interval(config)?;
    validate_spans(config)?;
    validate_reverse(config)?;
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_initial_investment(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let value = config.get_double("backtest", "initial_investment", DEFAULT_INITIAL_INVESTMENT);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "initial_investment",
            "initial_investment must be a positive finite number",
        ));
    }
    let raw = config.get_string("backtest", "initial_investment");
    if raw.as_deref().is_some_and(|s| s.trim().parse::<f64>().is_err()) {
        return Err(invalid("initial_investment", "initial_investment must be a number"));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let label = config
        .get_string("backtest", "period")
        .unwrap_or_else(|| DEFAULT_PERIOD.to_string());
    Lookback::parse(&label).map_err(|e| invalid("period", e.to_string()))?;
    Ok(())
}

fn validate_interval(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let label = config
        .get_string("backtest", "interval")
        .unwrap_or_else(|| DEFAULT_INTERVAL.to_string());
    Interval::parse(&label).map_err(|e| invalid("interval", e.to_string()))?;
    Ok(())
}

fn validate_spans(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let spans = match config.get_list("backtest", "spans") {
        Some(tokens) => parse_spans(&tokens)?,
        None => return Ok(()),
    };
    if let Some(missing) = DEFAULT_SPANS.into_iter().find(|s| !spans.contains(s)) {
        return Err(invalid(
            "spans",
            format!("spans must include {} (EMA_{} is required)", missing, missing),
        ));
    }
    Ok(())
}

fn validate_reverse(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "reverse") {
        Some(raw) if parse_bool(&raw).is_none() => Err(invalid(
            "reverse",
            format!("'{}' is not a boolean (true/false, yes/no, on/off, 1/0)", raw.trim()),
        )),
        _ => Ok(()),
    }
}

/// Parses span tokens into sorted, de-duplicated positive spans.
pub fn parse_spans<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<usize>, BacktestError> {
    let mut spans = Vec::new();
    for token in tokens.iter().map(|t| t.as_ref().trim()) {
        let span: usize = token
            .parse()
            .map_err(|_| invalid("spans", format!("'{}' is not a positive integer", token)))?;
        if span == 0 {
            return Err(invalid("spans", "spans must be positive"));
        }
        spans.push(span);
    }
    if spans.is_empty() {
        return Err(invalid("spans", "spans must not be empty"));
    }
    spans.sort_unstable();
    spans.dedup();
    Ok(spans)
}
