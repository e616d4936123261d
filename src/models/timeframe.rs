use crate::error::SignalError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle granularity such as `5m`, `1h` or `1d`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    minutes: u32,
}

impl Timeframe {
    pub const M5: Timeframe = Timeframe { minutes: 5 };
    pub const H1: Timeframe = Timeframe { minutes: 60 };

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(Self { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> i64 {
        self.minutes as i64 * 60
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes as i64)
    }
}

impl FromStr for Timeframe {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SignalError::InvalidTimeframe(s.to_string());

        let unit_start = match s.char_indices().last() {
            Some((i, _)) if i > 0 => i,
            _ => return Err(invalid()),
        };
        let (value, unit) = s.split_at(unit_start);
        let value: u32 = value.parse().map_err(|_| invalid())?;
        let scale = match unit {
            "m" => 1,
            "h" => 60,
            "d" => 60 * 24,
            "w" => 60 * 24 * 7,
            _ => return Err(invalid()),
        };

        value
            .checked_mul(scale)
            .and_then(Self::from_minutes)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Timeframe {
    type Error = SignalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes;
        if m % (60 * 24 * 7) == 0 {
            write!(f, "{}w", m / (60 * 24 * 7))
        } else if m % (60 * 24) == 0 {
            write!(f, "{}d", m / (60 * 24))
        } else if m % 60 == 0 {
            write!(f, "{}h", m / 60)
        } else {
            write!(f, "{}m", m)
        }
    }
}
