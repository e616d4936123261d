mod frame;
mod timeframe;

pub use frame::{IndicatorFrame, IndicatorRecord, SignalResult};
pub use timeframe::Timeframe;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OHLCV candlestick data for one pair and one timeframe step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Trading signal handed to the host
///
/// `Buy` opens a long, `Sell` closes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Long,
    Short,
}

/// Host-owned view of an open trade, passed into stoploss queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub pair: String,
    pub side: TradeSide,
    pub open_rate: f64,
    pub open_time: DateTime<Utc>,
    pub amount: f64,
    pub leverage: f64,
    /// Highest rate seen since the trade opened
    pub max_rate: f64,
}

impl Trade {
    pub fn new(pair: impl Into<String>, open_rate: f64, amount: f64, open_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pair: pair.into(),
            side: TradeSide::Long,
            open_rate,
            open_time,
            amount,
            leverage: 1.0,
            max_rate: open_rate,
        }
    }

    /// Profit fraction at `rate`, before leverage and fees
    pub fn profit_ratio(&self, rate: f64) -> f64 {
        match self.side {
            TradeSide::Long => rate / self.open_rate - 1.0,
            TradeSide::Short => 1.0 - rate / self.open_rate,
        }
    }

    /// Whole minutes the trade has been open at `now`
    pub fn minutes_open(&self, now: DateTime<Utc>) -> i64 {
        (now - self.open_time).num_minutes().max(0)
    }
}
