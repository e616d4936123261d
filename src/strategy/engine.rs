use crate::config::StrategyConfig;
use crate::models::{IndicatorRecord, SignalResult};

/// Pure decision logic over indicator values
///
/// Holds only the static configuration, so one engine can be shared across
/// threads and pairs. No method fails: a missing or non-finite input makes
/// the clause that reads it unsatisfied.
///
/// Entry conditions (ALL must be true):
/// - RSI below `rsi_buy` (oversold)
/// - MACD above its signal line (bullish)
/// - ATR above the previous ATR times `atr_multiplier` (volatility expansion)
/// - Informative RSI below `informative_rsi_max` (higher timeframe not overbought)
///
/// Exit conditions (ANY triggers exit):
/// - RSI above `rsi_sell` (overbought)
/// - MACD below its signal line (bearish)
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: StrategyConfig,
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl SignalEngine {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Whether `record` opens a long, given the record before it
    ///
    /// The first record of a series has no previous ATR and never enters.
    pub fn entry_decision(&self, record: &IndicatorRecord, previous: Option<&IndicatorRecord>) -> bool {
        let Some(previous) = previous else {
            return false;
        };

        let (Some(rsi), Some(macd), Some(macd_signal), Some(atr), Some(prev_atr), Some(rsi_informative)) = (
            present(record.rsi),
            present(record.macd),
            present(record.macd_signal),
            present(record.atr),
            present(previous.atr),
            present(record.rsi_informative),
        ) else {
            return false;
        };

        let conditions = [
            rsi < self.config.rsi_buy,
            macd > macd_signal,
            atr > prev_atr * self.config.atr_multiplier,
            rsi_informative < self.config.informative_rsi_max,
        ];

        tracing::debug!(
            "Entry check @ {}: rsi={:.1} (<{}?={}), macd={:.4} vs signal={:.4} ({}), atr={:.4} vs prev={:.4}x{} ({}), rsi_informative={:.1} (<{}?={})",
            record.timestamp,
            rsi,
            self.config.rsi_buy,
            conditions[0],
            macd,
            macd_signal,
            conditions[1],
            atr,
            prev_atr,
            self.config.atr_multiplier,
            conditions[2],
            rsi_informative,
            self.config.informative_rsi_max,
            conditions[3]
        );

        conditions.iter().all(|&c| c)
    }

    /// Whether `record` closes an open long
    pub fn exit_decision(&self, record: &IndicatorRecord) -> bool {
        let overbought = present(record.rsi).is_some_and(|rsi| rsi > self.config.rsi_sell);

        let bearish = match (present(record.macd), present(record.macd_signal)) {
            (Some(macd), Some(signal)) => macd < signal,
            _ => false,
        };

        overbought || bearish
    }

    /// Entry and exit flags for one record
    pub fn evaluate(&self, record: &IndicatorRecord, previous: Option<&IndicatorRecord>) -> SignalResult {
        SignalResult {
            enter_long: self.entry_decision(record, previous),
            exit_long: self.exit_decision(record),
        }
    }

    /// Stoploss for the current profit fraction
    ///
    /// Tightens once profit is strictly above `stoploss_tighten_above`.
    pub fn stoploss_for(&self, current_profit: f64) -> f64 {
        if current_profit.is_finite() && current_profit > self.config.stoploss_tighten_above {
            self.config.stoploss_tightened
        } else {
            self.config.stoploss
        }
    }

    /// Leverage for the given volatility
    ///
    /// Falls back to the default leverage when either value is missing.
    pub fn leverage_for(&self, latest_atr: Option<f64>, mean_atr: Option<f64>) -> f64 {
        match (present(latest_atr), present(mean_atr)) {
            (Some(latest), Some(mean)) if latest > mean * self.config.leverage_volatility_ratio => {
                self.config.leverage_high_volatility
            }
            _ => self.config.leverage_default,
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}
