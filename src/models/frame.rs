use super::{Signal, Timeframe};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One time step of the primary timeframe with its indicator columns
///
/// Indicator columns are `None` during warmup or when the source had no
/// value. Non-finite values are treated the same as `None` by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: Option<f64>,
    /// RSI of the informative timeframe, forward-filled onto this record
    pub rsi_informative: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub atr: Option<f64>,
    pub enter_long: bool,
    pub exit_long: bool,
}

impl IndicatorRecord {
    pub fn signal(&self) -> SignalResult {
        SignalResult {
            enter_long: self.enter_long,
            exit_long: self.exit_long,
        }
    }
}

/// Time-ordered indicator records for a single pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub pair: String,
    pub timeframe: Timeframe,
    pub records: Vec<IndicatorRecord>,
}

impl IndicatorFrame {
    pub fn new(pair: impl Into<String>, timeframe: Timeframe, records: Vec<IndicatorRecord>) -> Self {
        Self {
            pair: pair.into(),
            timeframe,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndicatorRecord> {
        self.records.iter()
    }

    /// ATR values that are present and finite, in time order
    pub fn atr_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.atr)
            .filter(|v| v.is_finite())
    }

    pub fn signals(&self) -> Vec<SignalResult> {
        self.records.iter().map(IndicatorRecord::signal).collect()
    }
}

/// Entry/exit flags for one record
///
/// Both flags are computed independently, so a record can carry both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalResult {
    pub enter_long: bool,
    pub exit_long: bool,
}

impl SignalResult {
    /// Collapse the flags into one action. Exit wins over entry.
    pub fn action(&self) -> Signal {
        if self.exit_long {
            Signal::Sell
        } else if self.enter_long {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}
