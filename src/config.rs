use crate::error::SignalError;
use crate::models::Timeframe;
use crate::risk::{MinimalRoi, TrailingStop};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `SIGNALBOT__RSI_BUY=25`
pub const ENV_PREFIX: &str = "SIGNALBOT";

/// Static strategy configuration
///
/// Read once at start-up and never mutated afterwards. Every field has a
/// default, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Primary candle timeframe
    pub timeframe: Timeframe,
    /// Coarser timeframe used to confirm the broader trend
    pub informative_timeframe: Timeframe,

    pub minimal_roi: MinimalRoi,

    /// Base stoploss as a (negative) fraction of the open rate
    pub stoploss: f64,
    /// Profit above which the stoploss is tightened
    pub stoploss_tighten_above: f64,
    /// Stoploss once tightened
    pub stoploss_tightened: f64,
    pub trailing_stop: TrailingStop,
    pub can_short: bool,

    pub rsi_length: usize,
    /// RSI level below which longs may open (oversold)
    pub rsi_buy: f64,
    /// RSI level above which longs close (overbought)
    pub rsi_sell: f64,
    /// Informative RSI must stay below this for an entry
    pub informative_rsi_max: f64,

    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,

    pub atr_length: usize,
    /// Required ATR growth over the previous candle for an entry
    pub atr_multiplier: f64,

    pub leverage_default: f64,
    pub leverage_high_volatility: f64,
    /// Latest ATR above `mean * ratio` counts as high volatility
    pub leverage_volatility_ratio: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::M5,
            informative_timeframe: Timeframe::H1,
            minimal_roi: MinimalRoi::default(),
            stoploss: -0.05,
            stoploss_tighten_above: 0.05,
            stoploss_tightened: -0.02,
            trailing_stop: TrailingStop::default(),
            can_short: false,
            rsi_length: 14,
            rsi_buy: 30.0,
            rsi_sell: 70.0,
            informative_rsi_max: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_length: 14,
            atr_multiplier: 1.5,
            leverage_default: 3.0,
            leverage_high_volatility: 2.0,
            leverage_volatility_ratio: 1.5,
        }
    }
}

impl StrategyConfig {
    /// Load configuration from an optional TOML file with environment overrides
    ///
    /// Sources, later ones winning:
    /// 1. built-in defaults
    /// 2. `path`, if given (must exist)
    /// 3. `SIGNALBOT__*` environment variables (`SIGNALBOT__TRAILING_STOP__POSITIVE=0.02`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            tracing::info!("Loading strategy config from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: StrategyConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!("Strategy config: {:?}", config);
        Ok(config)
    }

    /// Reject combinations the strategy cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SignalError::InvalidConfig(msg));

        if self.rsi_length == 0 || self.atr_length == 0 {
            return invalid("rsi_length and atr_length must be positive".into());
        }
        if self.macd_fast == 0 || self.macd_signal == 0 || self.macd_fast >= self.macd_slow {
            return invalid(format!(
                "MACD periods must satisfy 0 < fast < slow and signal > 0 (got {}/{}/{})",
                self.macd_fast, self.macd_slow, self.macd_signal
            ));
        }
        if !(self.rsi_buy < self.rsi_sell) {
            return invalid(format!(
                "rsi_buy ({}) must be below rsi_sell ({})",
                self.rsi_buy, self.rsi_sell
            ));
        }
        if !(self.stoploss < 0.0) || !(self.stoploss_tightened < 0.0) {
            return invalid("stoploss values must be negative fractions".into());
        }
        if !(self.leverage_default > 0.0) || !(self.leverage_high_volatility > 0.0) {
            return invalid("leverage values must be positive".into());
        }
        if !(self.atr_multiplier > 0.0) || !(self.leverage_volatility_ratio > 0.0) {
            return invalid("volatility multipliers must be positive".into());
        }
        if self.informative_timeframe <= self.timeframe {
            return invalid(format!(
                "informative timeframe {} must be coarser than {}",
                self.informative_timeframe, self.timeframe
            ));
        }
        if self.can_short {
            return invalid("short entries are not supported".into());
        }
        if self.minimal_roi.is_empty() {
            return invalid("minimal_roi needs at least one entry".into());
        }

        Ok(())
    }

    /// Candles needed before every indicator has a value
    pub fn startup_candle_count(&self) -> usize {
        // MACD signal line starts at slow + signal - 2; ATR and RSI at their length
        (self.macd_slow + self.macd_signal - 1)
            .max(self.atr_length + 1)
            .max(self.rsi_length + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // `load` reads the process environment; serialize the tests that touch it
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_are_valid() {
        let config = StrategyConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.timeframe.to_string(), "5m");
        assert_eq!(config.informative_timeframe.to_string(), "1h");
        assert_eq!(config.rsi_buy, 30.0);
        assert_eq!(config.rsi_sell, 70.0);
        assert_eq!((config.macd_fast, config.macd_slow, config.macd_signal), (12, 26, 9));
        assert_eq!(config.atr_length, 14);
        assert_eq!(config.atr_multiplier, 1.5);
        assert_eq!(config.stoploss, -0.05);
        assert!(!config.can_short);
    }

    #[test]
    fn test_startup_candle_count() {
        assert_eq!(StrategyConfig::default().startup_candle_count(), 34);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StrategyConfig::default();
        config.macd_fast = 30;
        assert!(matches!(config.validate(), Err(SignalError::InvalidConfig(_))));

        let mut config = StrategyConfig::default();
        config.rsi_buy = 80.0;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.stoploss = 0.05;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.informative_timeframe = Timeframe::M5;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.can_short = true;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.rsi_sell = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = std::env::temp_dir().join(format!("signalbot-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
rsi_buy = 25.0
informative_timeframe = "4h"

[minimal_roi]
"0" = 0.05
"30" = 0.02

[trailing_stop]
positive = 0.015
"#
        )
        .unwrap();

        let config = StrategyConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.rsi_buy, 25.0);
        assert_eq!(config.informative_timeframe.minutes(), 240);
        assert_eq!(config.minimal_roi.target_for(45), Some(0.02));
        assert_eq!(config.trailing_stop.positive, 0.015);
        // untouched values keep their defaults
        assert_eq!(config.trailing_stop.positive_offset, 0.02);
        assert_eq!(config.rsi_sell, 70.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = std::env::temp_dir().join("signalbot-does-not-exist.toml");
        assert!(matches!(
            StrategyConfig::load(Some(&path)),
            Err(SignalError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("SIGNALBOT__RSI_BUY", "25");
        std::env::set_var("SIGNALBOT__TRAILING_STOP__POSITIVE", "0.02");
        std::env::set_var("SIGNALBOT__INFORMATIVE_TIMEFRAME", "4h");

        let loaded = StrategyConfig::load(None);

        std::env::remove_var("SIGNALBOT__RSI_BUY");
        std::env::remove_var("SIGNALBOT__TRAILING_STOP__POSITIVE");
        std::env::remove_var("SIGNALBOT__INFORMATIVE_TIMEFRAME");

        let config = loaded.unwrap();
        assert_eq!(config.rsi_buy, 25.0);
        assert_eq!(config.trailing_stop.positive, 0.02);
        assert_eq!(config.informative_timeframe.minutes(), 240);
        assert_eq!(config.trailing_stop.positive_offset, 0.02);
        assert_eq!(config.rsi_sell, 70.0);
    }

    #[test]
    fn test_env_override_is_validated() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("SIGNALBOT__CAN_SHORT", "true");

        let loaded = StrategyConfig::load(None);

        std::env::remove_var("SIGNALBOT__CAN_SHORT");

        assert!(matches!(loaded, Err(SignalError::InvalidConfig(_))));
        assert!(StrategyConfig::load(None).is_ok());
    }
}
