use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimal ROI table: minutes since entry -> profit fraction that closes the trade
///
/// Serialized as a map with string keys (`{"0": 0.03, "60": 0.015}`) so it
/// reads naturally from TOML and JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct MinimalRoi {
    table: BTreeMap<u32, f64>,
}

impl MinimalRoi {
    pub fn new(entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.table.iter().map(|(k, v)| (*k, *v))
    }

    /// ROI target in effect after `minutes_open`
    ///
    /// Picks the entry with the largest key not above `minutes_open`.
    pub fn target_for(&self, minutes_open: i64) -> Option<f64> {
        let minutes = u32::try_from(minutes_open.max(0)).unwrap_or(u32::MAX);
        self.table.range(..=minutes).next_back().map(|(_, roi)| *roi)
    }

    /// Whether `profit` has reached the target in effect after `minutes_open`
    pub fn should_exit(&self, minutes_open: i64, profit: f64) -> bool {
        match self.target_for(minutes_open) {
            Some(target) => profit >= target,
            None => false,
        }
    }
}

impl Default for MinimalRoi {
    fn default() -> Self {
        Self::new([
            (0, 0.03),    // 3% right away
            (60, 0.015),  // 1.5% after an hour
            (120, 0.01),  // 1% after two hours
        ])
    }
}

impl TryFrom<BTreeMap<String, f64>> for MinimalRoi {
    type Error = String;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut table = BTreeMap::new();
        for (minutes, roi) in raw {
            let key: u32 = minutes
                .trim()
                .parse()
                .map_err(|_| format!("minimal_roi key '{}' is not a minute count", minutes))?;
            table.insert(key, roi);
        }
        Ok(Self { table })
    }
}

impl From<MinimalRoi> for BTreeMap<String, f64> {
    fn from(roi: MinimalRoi) -> Self {
        roi.table.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}
