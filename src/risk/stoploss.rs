use crate::models::Trade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arguments of the host's custom stoploss hook
#[derive(Debug, Clone)]
pub struct StoplossRequest<'a> {
    pub pair: &'a str,
    pub trade: &'a Trade,
    pub current_time: DateTime<Utc>,
    pub current_rate: f64,
    /// Current profit as a fraction of the open rate (0.05 = +5%)
    pub current_profit: f64,
    pub after_fill: bool,
}

/// Trailing stop parameters
///
/// While the best profit is at or below `positive_offset` the stop trails the
/// highest rate at the base stoploss distance. Beyond the offset it trails
/// `positive` below the highest rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailingStop {
    pub enabled: bool,
    pub positive: f64,
    pub positive_offset: f64,
}

impl Default for TrailingStop {
    fn default() -> Self {
        Self {
            enabled: true,
            positive: 0.01,        // trail 1% below the high
            positive_offset: 0.02, // once +2% has been seen
        }
    }
}

impl TrailingStop {
    /// Stop price for a long trade
    ///
    /// `highest_rate` only grows over a trade's life, so the returned stop
    /// never moves down.
    pub fn stop_rate(&self, open_rate: f64, highest_rate: f64, base_stoploss: f64) -> f64 {
        let initial = open_rate * (1.0 + base_stoploss);
        if !self.enabled {
            return initial;
        }

        let highest = highest_rate.max(open_rate);
        let mut stop = highest * (1.0 + base_stoploss);

        let best_profit = highest / open_rate - 1.0;
        if best_profit > self.positive_offset {
            stop = stop.max(highest * (1.0 - self.positive));
        }

        stop
    }

    pub fn stop_rate_for(&self, trade: &Trade, base_stoploss: f64) -> f64 {
        self.stop_rate(trade.open_rate, trade.max_rate, base_stoploss)
    }
}
