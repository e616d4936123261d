// Trading strategy module
pub mod engine;
pub mod rsi_macd_atr;

pub use engine::SignalEngine;
pub use rsi_macd_atr::RsiMacdAtrStrategy;

use crate::models::{Candle, IndicatorFrame, Signal, Timeframe};
use crate::risk::{LeverageRequest, StoplossRequest};
use crate::Result;

/// Hooks a host engine calls on a strategy
///
/// The host owns candles, orders and positions; the strategy only annotates
/// frames with signals and answers risk queries.
pub trait Strategy: Send + Sync {
    /// Get strategy name
    fn name(&self) -> &str;

    /// Primary candle timeframe
    fn timeframe(&self) -> Timeframe;

    /// Candles needed before signals are meaningful
    fn startup_candle_count(&self) -> usize;

    /// Extra (pair, timeframe) feeds the host must supply
    fn informative_pairs(&self) -> Vec<(String, Timeframe)>;

    /// Build the indicator frame for `pair` from primary-timeframe candles
    fn populate_indicators(&self, candles: &[Candle], pair: &str) -> Result<IndicatorFrame>;

    /// Set `enter_long` on every record
    fn populate_entry_trend(&self, frame: IndicatorFrame) -> IndicatorFrame;

    /// Set `exit_long` on every record
    fn populate_exit_trend(&self, frame: IndicatorFrame) -> IndicatorFrame;

    /// Stoploss fraction for an open trade
    fn custom_stoploss(&self, request: &StoplossRequest<'_>) -> f64;

    /// Leverage multiplier for a new trade
    fn leverage(&self, request: &LeverageRequest) -> f64;

    /// Run all populate steps in order
    fn analyze(&self, candles: &[Candle], pair: &str) -> Result<IndicatorFrame> {
        let frame = self.populate_indicators(candles, pair)?;
        let frame = self.populate_entry_trend(frame);
        Ok(self.populate_exit_trend(frame))
    }

    /// Action for the latest candle, exit taking priority over entry
    fn latest_signal(&self, candles: &[Candle], pair: &str) -> Result<Signal> {
        let frame = self.analyze(candles, pair)?;
        Ok(frame
            .last()
            .map(|record| record.signal().action())
            .unwrap_or(Signal::Hold))
    }
}
