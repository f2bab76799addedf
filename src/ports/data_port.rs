//! Candle data port.

use crate::domain::error::SignalgradeError;
use crate::domain::ohlcv::Candle;

pub trait DataPort {
    /// Candles for `asset`, oldest first.
    fn fetch_candles(&self, asset: &str) -> Result<Vec<Candle>, SignalgradeError>;

    fn list_assets(&self) -> Result<Vec<String>, SignalgradeError>;
}
