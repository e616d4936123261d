// Technical indicators module
// Implements RSI, EMA/SMA, MACD, ATR as series aligned with their input

pub mod atr;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use atr::calculate_atr_series;
pub use macd::{calculate_macd, MacdSeries};
pub use moving_average::calculate_ema_series;
pub use rsi::calculate_rsi_series;

use crate::config::StrategyConfig;
use crate::models::Candle;

/// Primary-timeframe indicator columns, one entry per candle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

/// Source of indicator math
///
/// The strategy only consumes the resulting series, so a host can plug in
/// its own library as long as outputs stay aligned with the candles.
pub trait IndicatorSource: Send + Sync {
    /// Compute RSI, MACD and ATR for the primary timeframe
    fn compute(&self, candles: &[Candle], config: &StrategyConfig) -> IndicatorSeries;

    /// RSI over closes, used for the informative timeframe
    fn rsi(&self, closes: &[f64], period: usize) -> Vec<Option<f64>>;
}

/// Built-in indicator implementations
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalIndicators;

impl IndicatorSource for TechnicalIndicators {
    fn compute(&self, candles: &[Candle], config: &StrategyConfig) -> IndicatorSeries {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let macd = calculate_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);

        IndicatorSeries {
            rsi: calculate_rsi_series(&closes, config.rsi_length),
            macd: macd.macd,
            macd_signal: macd.signal,
            atr: calculate_atr_series(candles, config.atr_length),
        }
    }

    fn rsi(&self, closes: &[f64], period: usize) -> Vec<Option<f64>> {
        calculate_rsi_series(closes, period)
    }
}
