//! Price history source port.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::{Interval, Lookback};

pub trait PriceSeriesSource {
    /// Bars for `symbol` covering `period`, sampled at `interval`, ascending
    /// by date. Fails with `UnknownSymbol` when the symbol has no history.
    fn fetch_history(
        &self,
        symbol: &str,
        period: Lookback,
        interval: Interval,
    ) -> Result<Vec<OhlcvBar>, BacktestError>;

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError>;
}
