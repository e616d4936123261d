use crate::models::{Candle, Timeframe};
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+2% daily average)
    Uptrend,
    /// Steady downtrend with noise (-2% daily average)
    Downtrend,
    /// Sideways/choppy market around the base price
    Sideways,
    /// High volatility (±5% large swings)
    Volatile,
    /// Quiet range, sharp sell-off, then a wide-ranging rebound
    Capitulation,
}

/// Depth of the capitulation flush wick below the close
const FLUSH_WICK_PCT: f64 = 0.2;

/// End of the quiet range and of the sell-off, as candle indices
fn capitulation_phases(num_candles: usize) -> (usize, usize) {
    (num_candles * 6 / 10, num_candles * 8 / 10)
}

/// Generates reproducible candles for demos and tests
pub struct SyntheticDataGenerator {
    rng: StdRng,
    pair: String,
    start_time: DateTime<Utc>,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pair: "BTC/USDT:USDT".to_string(),
            // 2025-01-01T00:00:00Z
            start_time: DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default(),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    pub fn with_pair(mut self, pair: impl Into<String>) -> Self {
        self.pair = pair.into();
        self
    }

    pub fn with_start(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Generate `num_candles` candles of `timeframe` for a market scenario
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        timeframe: Timeframe,
    ) -> Vec<Candle> {
        let interval_minutes = timeframe.minutes() as i64;
        let mut candles = Vec::with_capacity(num_candles);
        let mut current_price = self.base_price;

        for i in 0..num_candles {
            let timestamp = self.start_time + Duration::minutes(i as i64 * interval_minutes);
            let (next_price, range_pct) =
                self.step(scenario, i, num_candles, interval_minutes, current_price);
            current_price = next_price.max(self.base_price * 0.05);

            let mut candle = self.create_candle(current_price, timestamp, range_pct);
            if scenario == MarketScenario::Capitulation && i + 1 == capitulation_phases(num_candles).1 {
                // Flush on the last sell-off candle: long lower wick, close on trend
                candle.low = candle.close * (1.0 - FLUSH_WICK_PCT);
            }
            candles.push(candle);
        }

        candles
    }

    /// Next close and intrabar range for one scenario step
    fn step(
        &mut self,
        scenario: MarketScenario,
        i: usize,
        num_candles: usize,
        interval_minutes: i64,
        price: f64,
    ) -> (f64, f64) {
        let candles_per_day = 24.0 * 60.0 / interval_minutes as f64;

        match scenario {
            MarketScenario::Uptrend => {
                let drift = price * 0.02 / candles_per_day;
                let noise = price * self.rng.gen_range(-0.001..0.001);
                (price + drift + noise, 0.002)
            }
            MarketScenario::Downtrend => {
                let drift = -price * 0.02 / candles_per_day;
                let noise = price * self.rng.gen_range(-0.001..0.001);
                (price + drift + noise, 0.002)
            }
            MarketScenario::Sideways => {
                let reversion = (self.base_price - price) * 0.1;
                let noise = price * self.rng.gen_range(-0.01..0.01);
                (price + reversion + noise, 0.004)
            }
            MarketScenario::Volatile => {
                let change = price * self.rng.gen_range(-0.05..0.05);
                (price + change, 0.02)
            }
            MarketScenario::Capitulation => {
                let (quiet_end, selloff_end) = capitulation_phases(num_candles);

                if i < quiet_end {
                    let reversion = (self.base_price - price) * 0.1;
                    let noise = price * self.rng.gen_range(-0.003..0.003);
                    (price + reversion + noise, 0.002)
                } else if i < selloff_end {
                    let noise = price * self.rng.gen_range(-0.002..0.002);
                    (price * (1.0 - 0.012) + noise, 0.003)
                } else {
                    let noise = price * self.rng.gen_range(-0.015..0.015);
                    (price * 1.008 + noise, 0.02)
                }
            }
        }
    }

    /// Helper to create a candle from price and timestamp
    fn create_candle(&mut self, price: f64, timestamp: DateTime<Utc>, range_pct: f64) -> Candle {
        // Generate high and low around the close price
        let high = price * (1.0 + self.rng.gen_range(0.0..range_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..range_pct));

        // Generate open and clamp it between low and high
        let open_raw = price * (1.0 + self.rng.gen_range(-range_pct..range_pct));
        let open = open_raw.clamp(low, high);

        // Vary volume ±30%
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle {
            pair: self.pair.clone(),
            timestamp,
            open,
            high,
            low,
            close: price,
            volume,
        }
    }
}
