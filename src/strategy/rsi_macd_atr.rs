use super::{SignalEngine, Strategy};
use crate::config::StrategyConfig;
use crate::feed::{validate_candle_order, DataProvider};
use crate::indicators::{IndicatorSource, TechnicalIndicators};
use crate::informative::{informative_pairs, merge_informative, resample};
use crate::models::{Candle, IndicatorFrame, IndicatorRecord, Timeframe};
use crate::risk::{LeverageRequest, StoplossRequest};
use crate::Result;
use std::sync::Arc;

/// RSI/MACD/ATR futures strategy on 5m candles with a 1h RSI filter
///
/// Buys oversold dips that come with a bullish MACD and a volatility burst,
/// as long as the hourly RSI is not overbought. Exits on overbought RSI or a
/// bearish MACD. Stoploss tightens once the trade is well in profit and
/// leverage drops when volatility runs hot.
pub struct RsiMacdAtrStrategy {
    engine: SignalEngine,
    indicators: Box<dyn IndicatorSource>,
    data: Arc<dyn DataProvider>,
}

impl RsiMacdAtrStrategy {
    pub fn new(config: StrategyConfig, data: Arc<dyn DataProvider>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            engine: SignalEngine::new(config),
            indicators: Box::new(TechnicalIndicators),
            data,
        })
    }

    /// Swap the indicator implementation
    pub fn with_indicator_source(mut self, indicators: Box<dyn IndicatorSource>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn config(&self) -> &StrategyConfig {
        self.engine.config()
    }

    /// Informative RSI forward-filled onto the primary candles
    fn informative_rsi(&self, candles: &[Candle], pair: &str) -> Result<Vec<Option<f64>>> {
        let config = self.config();
        let timeframe = config.informative_timeframe;

        let mut informative = self.data.candles(pair, timeframe);
        if informative.is_empty() {
            tracing::warn!(
                "No {} candles for {} from the data provider, resampling {} candles",
                timeframe,
                pair,
                config.timeframe
            );
            informative = resample(candles, timeframe);
        }
        validate_candle_order(&informative)?;

        let closes: Vec<f64> = informative.iter().map(|c| c.close).collect();
        let rsi = self.indicators.rsi(&closes, config.rsi_length);
        let points: Vec<_> = informative
            .iter()
            .zip(rsi)
            .map(|(candle, value)| (candle.timestamp, value))
            .collect();

        let timestamps: Vec<_> = candles.iter().map(|c| c.timestamp).collect();
        Ok(merge_informative(&timestamps, config.timeframe, &points, timeframe))
    }
}

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

impl Strategy for RsiMacdAtrStrategy {
    fn name(&self) -> &str {
        "RSI/MACD/ATR"
    }

    fn timeframe(&self) -> Timeframe {
        self.config().timeframe
    }

    fn startup_candle_count(&self) -> usize {
        self.config().startup_candle_count()
    }

    fn informative_pairs(&self) -> Vec<(String, Timeframe)> {
        informative_pairs(&self.data.current_whitelist(), self.config().informative_timeframe)
    }

    fn populate_indicators(&self, candles: &[Candle], pair: &str) -> Result<IndicatorFrame> {
        validate_candle_order(candles)?;

        if candles.len() < self.startup_candle_count() {
            tracing::debug!(
                "{}: {} candles, indicators need {} to warm up",
                pair,
                candles.len(),
                self.startup_candle_count()
            );
        }

        let series = self.indicators.compute(candles, self.config());
        let rsi_informative = self.informative_rsi(candles, pair)?;

        let records = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| IndicatorRecord {
                timestamp: candle.timestamp,
                close: candle.close,
                rsi: column(&series.rsi, i),
                rsi_informative: column(&rsi_informative, i),
                macd: column(&series.macd, i),
                macd_signal: column(&series.macd_signal, i),
                atr: column(&series.atr, i),
                enter_long: false,
                exit_long: false,
            })
            .collect();

        Ok(IndicatorFrame::new(pair, self.config().timeframe, records))
    }

    fn populate_entry_trend(&self, mut frame: IndicatorFrame) -> IndicatorFrame {
        let entries: Vec<bool> = (0..frame.records.len())
            .map(|i| {
                let previous = i.checked_sub(1).map(|p| &frame.records[p]);
                self.engine.entry_decision(&frame.records[i], previous)
            })
            .collect();

        for (record, enter) in frame.records.iter_mut().zip(entries) {
            record.enter_long = enter;
            if enter {
                tracing::info!(
                    "🎯 ENTRY {} @ {:.4} ({}): rsi={:.1}, rsi_{}={:.1}, atr={:.4}",
                    frame.pair,
                    record.close,
                    record.timestamp,
                    record.rsi.unwrap_or(f64::NAN),
                    self.engine.config().informative_timeframe,
                    record.rsi_informative.unwrap_or(f64::NAN),
                    record.atr.unwrap_or(f64::NAN)
                );
            }
        }

        frame
    }

    fn populate_exit_trend(&self, mut frame: IndicatorFrame) -> IndicatorFrame {
        for record in frame.records.iter_mut() {
            record.exit_long = self.engine.exit_decision(record);
        }
        frame
    }

    fn custom_stoploss(&self, request: &StoplossRequest<'_>) -> f64 {
        let stoploss = self.engine.stoploss_for(request.current_profit);
        tracing::debug!(
            "Stoploss {} trade {}: profit={:.4} -> {:.4}",
            request.pair,
            request.trade.id,
            request.current_profit,
            stoploss
        );
        stoploss
    }

    fn leverage(&self, request: &LeverageRequest) -> f64 {
        let volatility = request.volatility.unwrap_or_default();
        let leverage = self.engine.leverage_for(volatility.latest_atr, volatility.mean_atr);
        tracing::debug!(
            "Leverage {} ({:?}): latest_atr={:?}, mean_atr={:?} -> {}x",
            request.pair,
            request.side,
            volatility.latest_atr,
            volatility.mean_atr,
            leverage
        );
        leverage
    }
}
