// Market data feed module
pub mod memory;
pub mod synthetic;

pub use memory::InMemoryDataProvider;
pub use synthetic::{MarketScenario, SyntheticDataGenerator};

use crate::error::SignalError;
use crate::models::{Candle, Timeframe};
use crate::Result;
use std::path::Path;

/// Host-side market data the strategy may ask for
///
/// Implementations must return candles in ascending time order.
pub trait DataProvider: Send + Sync {
    /// Pairs currently traded by the host
    fn current_whitelist(&self) -> Vec<String>;

    /// Candles of `pair` on `timeframe`, oldest first. Empty if unknown.
    fn candles(&self, pair: &str, timeframe: Timeframe) -> Vec<Candle>;
}

/// Check that candles are strictly increasing in time
///
/// # Returns
/// * `Ok(())` if every candle is later than the one before it
/// * `Err(SignalError::UnorderedCandles)` at the first violation
pub fn validate_candle_order(candles: &[Candle]) -> Result<()> {
    for (i, window) in candles.windows(2).enumerate() {
        if window[1].timestamp <= window[0].timestamp {
            return Err(SignalError::UnorderedCandles {
                index: i + 1,
                previous: window[0].timestamp,
                current: window[1].timestamp,
            });
        }
    }

    Ok(())
}

/// Read a JSON array of candles from disk
pub fn load_candles_json(path: &Path) -> Result<Vec<Candle>> {
    let raw = std::fs::read_to_string(path)?;
    let candles: Vec<Candle> = serde_json::from_str(&raw)?;

    tracing::info!("Loaded {} candles from {}", candles.len(), path.display());
    Ok(candles)
}
