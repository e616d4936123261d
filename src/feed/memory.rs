use super::DataProvider;
use crate::models::{Candle, Timeframe};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, RwLock};

type Key = (String, Timeframe);

/// Thread-safe in-memory data provider
///
/// Maintains a rolling window of candles per (pair, timeframe) and the
/// whitelist of traded pairs. Clones share the same storage.
#[derive(Clone)]
pub struct InMemoryDataProvider {
    data: Arc<RwLock<HashMap<Key, VecDeque<Candle>>>>,
    whitelist: Arc<RwLock<BTreeSet<String>>>,
    max_candles: usize,
}

impl InMemoryDataProvider {
    /// Create a new provider
    ///
    /// # Arguments
    /// * `max_candles` - Maximum number of candles to keep per pair and timeframe
    pub fn new(max_candles: usize) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            whitelist: Arc::new(RwLock::new(BTreeSet::new())),
            max_candles,
        }
    }

    pub fn add_to_whitelist(&self, pair: impl Into<String>) -> Result<(), String> {
        let mut whitelist = self.whitelist.write().map_err(|e| e.to_string())?;
        whitelist.insert(pair.into());
        Ok(())
    }

    /// Add a candle for its pair on `timeframe`
    ///
    /// If the window is full, removes the oldest candle
    pub fn add_candle(&self, timeframe: Timeframe, candle: Candle) -> Result<(), String> {
        let mut data = self.data.write().map_err(|e| e.to_string())?;

        let window = data
            .entry((candle.pair.clone(), timeframe))
            .or_insert_with(VecDeque::new);

        window.push_back(candle);

        while window.len() > self.max_candles {
            window.pop_front();
        }

        Ok(())
    }

    pub fn extend(&self, timeframe: Timeframe, candles: impl IntoIterator<Item = Candle>) -> Result<(), String> {
        for candle in candles {
            self.add_candle(timeframe, candle)?;
        }
        Ok(())
    }
}

impl DataProvider for InMemoryDataProvider {
    fn current_whitelist(&self) -> Vec<String> {
        match self.whitelist.read() {
            Ok(whitelist) => whitelist.iter().cloned().collect(),
            Err(e) => {
                tracing::warn!("Whitelist lock poisoned: {}", e);
                Vec::new()
            }
        }
    }

    fn candles(&self, pair: &str, timeframe: Timeframe) -> Vec<Candle> {
        match self.data.read() {
            Ok(data) => data
                .get(&(pair.to_string(), timeframe))
                .map(|deque| deque.iter().cloned().collect())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Candle store lock poisoned: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_candle(pair: &str, price: f64) -> Candle {
        Candle {
            pair: pair.to_string(),
            timestamp: Utc::now(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_new_provider() {
        let provider = InMemoryDataProvider::new(100);
        assert_eq!(provider.max_candles, 100);
        assert!(provider.current_whitelist().is_empty());
        assert!(provider.candles("BTC/USDT:USDT", Timeframe::M5).is_empty());
    }

    #[test]
    fn test_add_and_get_candles() {
        let provider = InMemoryDataProvider::new(100);

        provider.add_candle(Timeframe::M5, create_test_candle("BTC/USDT:USDT", 100.0)).unwrap();
        provider.add_candle(Timeframe::M5, create_test_candle("BTC/USDT:USDT", 101.0)).unwrap();
        provider.add_candle(Timeframe::H1, create_test_candle("BTC/USDT:USDT", 102.0)).unwrap();

        let candles = provider.candles("BTC/USDT:USDT", Timeframe::M5);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 100.0);
        assert_eq!(candles[1].close, 101.0);
        assert_eq!(provider.candles("BTC/USDT:USDT", Timeframe::H1).len(), 1);
    }

    #[test]
    fn test_max_candles_limit() {
        let provider = InMemoryDataProvider::new(5);

        // Add 10 candles
        for i in 0..10 {
            provider
                .add_candle(Timeframe::M5, create_test_candle("BTC/USDT:USDT", 100.0 + i as f64))
                .unwrap();
        }

        let candles = provider.candles("BTC/USDT:USDT", Timeframe::M5);
        assert_eq!(candles.len(), 5); // Should only keep last 5

        // Should have prices 105-109
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[4].close, 109.0);
    }

    #[test]
    fn test_whitelist() {
        let provider = InMemoryDataProvider::new(10);

        provider.add_to_whitelist("ETH/USDT:USDT").unwrap();
        provider.add_to_whitelist("BTC/USDT:USDT").unwrap();
        provider.add_to_whitelist("ETH/USDT:USDT").unwrap();

        assert_eq!(
            provider.current_whitelist(),
            vec!["BTC/USDT:USDT".to_string(), "ETH/USDT:USDT".to_string()]
        );
    }

    #[test]
    fn test_pairs_are_kept_apart() {
        let provider = InMemoryDataProvider::new(100);

        provider.add_candle(Timeframe::M5, create_test_candle("BTC/USDT:USDT", 100.0)).unwrap();
        provider.add_candle(Timeframe::M5, create_test_candle("ETH/USDT:USDT", 200.0)).unwrap();

        let eth = provider.candles("ETH/USDT:USDT", Timeframe::M5);
        assert_eq!(eth.len(), 1);
        assert_eq!(eth[0].close, 200.0);
        assert!(provider.candles("ETH/USDT:USDT", Timeframe::H1).is_empty());
    }

    #[test]
    fn test_thread_safety() {
        use std::thread;

        let provider = InMemoryDataProvider::new(100);
        let provider_clone = provider.clone();

        let handle = thread::spawn(move || {
            for i in 0..50 {
                provider_clone
                    .add_candle(Timeframe::M5, create_test_candle("BTC/USDT:USDT", 100.0 + i as f64))
                    .unwrap();
            }
        });

        for i in 50..100 {
            provider
                .add_candle(Timeframe::M5, create_test_candle("BTC/USDT:USDT", 100.0 + i as f64))
                .unwrap();
        }

        handle.join().unwrap();

        // Should have 100 candles (max limit)
        assert_eq!(provider.candles("BTC/USDT:USDT", Timeframe::M5).len(), 100);
    }
}
