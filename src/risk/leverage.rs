use crate::models::{IndicatorFrame, TradeSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recent volatility as seen by the leverage hook
///
/// Both fields are optional: a host that cannot supply volatility simply
/// leaves them empty and gets the default leverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySnapshot {
    pub latest_atr: Option<f64>,
    pub mean_atr: Option<f64>,
}

impl VolatilitySnapshot {
    pub fn new(latest_atr: f64, mean_atr: f64) -> Self {
        Self {
            latest_atr: Some(latest_atr),
            mean_atr: Some(mean_atr),
        }
    }

    /// Last ATR of the frame and the mean over every present ATR value
    pub fn from_frame(frame: &IndicatorFrame) -> Self {
        let latest_atr = frame.last().and_then(|r| r.atr).filter(|v| v.is_finite());

        let (sum, count) = frame
            .atr_values()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        let mean_atr = (count > 0).then(|| sum / count as f64);

        Self {
            latest_atr,
            mean_atr,
        }
    }
}

/// Arguments of the host's leverage hook
#[derive(Debug, Clone)]
pub struct LeverageRequest {
    pub pair: String,
    pub current_time: DateTime<Utc>,
    pub current_rate: f64,
    pub proposed_leverage: f64,
    pub max_leverage: f64,
    pub entry_tag: Option<String>,
    pub side: TradeSide,
    pub volatility: Option<VolatilitySnapshot>,
}

impl LeverageRequest {
    pub fn new(pair: impl Into<String>, current_time: DateTime<Utc>, current_rate: f64) -> Self {
        Self {
            pair: pair.into(),
            current_time,
            current_rate,
            proposed_leverage: 1.0,
            max_leverage: 1.0,
            entry_tag: None,
            side: TradeSide::Long,
            volatility: None,
        }
    }

    pub fn with_volatility(mut self, volatility: VolatilitySnapshot) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn with_max_leverage(mut self, max_leverage: f64) -> Self {
        self.max_leverage = max_leverage;
        self
    }
}
