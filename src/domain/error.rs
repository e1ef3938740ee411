//! Domain error types.

/// Top-level error type for emacross.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price series is empty")]
    EmptySeries,

    #[error("price series is not strictly ascending at row {index}")]
    UnorderedSeries { index: usize },

    #[error("{field} at row {index} is not a finite number")]
    NonFinitePrice { index: usize, field: &'static str },

    #[error("required column EMA_{span} is missing")]
    MissingEma { span: usize },

    #[error("column {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("initial investment must be positive, got {value}")]
    InvalidInvestment { value: f64 },

    #[error("EMA span must be a positive integer, got {span}")]
    InvalidSpan { span: usize },

    #[error("unknown symbol {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("unsupported lookback period '{label}'")]
    UnsupportedPeriod { label: String },

    #[error("unsupported sampling interval '{label}'")]
    UnsupportedInterval { label: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub fn length_mismatch(column: impl Into<String>, expected: usize, actual: usize) -> Self {
        BacktestError::LengthMismatch {
            column: column.into(),
            expected,
            actual,
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::UnknownSymbol { .. }
            | BacktestError::UnsupportedPeriod { .. }
            | BacktestError::UnsupportedInterval { .. }
            | BacktestError::DataSource { .. } => 3,
            BacktestError::EmptySeries
            | BacktestError::UnorderedSeries { .. }
            | BacktestError::NonFinitePrice { .. }
            | BacktestError::MissingEma { .. }
            | BacktestError::LengthMismatch { .. }
            | BacktestError::InvalidInvestment { .. }
            | BacktestError::InvalidSpan { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_ema() {
        let err = BacktestError::MissingEma { span: 100 };
        assert_eq!(err.to_string(), "required column EMA_100 is missing");
    }

    #[test]
    fn display_length_mismatch() {
        let err = BacktestError::length_mismatch("pct_change", 4, 3);
        assert_eq!(err.to_string(), "column pct_change has 3 rows, expected 4");
    }

    #[test]
    fn display_config_invalid() {
        let err = BacktestError::ConfigInvalid {
            section: "backtest".into(),
            key: "spans".into(),
            reason: "not a number".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] spans: not a number"
        );
    }

    #[test]
    fn non_finite_price_is_precondition() {
        let err = BacktestError::NonFinitePrice { index: 3, field: "close" };
        assert_eq!(err.to_string(), "close at row 3 is not a finite number");
        let code: std::process::ExitCode = (&err).into();
        assert_eq!(format!("{:?}", code), format!("{:?}", std::process::ExitCode::from(5)));
    }

    #[test]
    fn io_converts_via_from() {
        let io = std::io::Error::other("disk gone");
        let err: BacktestError = io.into();
        assert!(matches!(err, BacktestError::Io(_)));
    }
}
