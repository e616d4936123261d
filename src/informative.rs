//! Informative (higher) timeframe support
//!
//! The strategy confirms 5m entries against a coarser RSI. The coarser series
//! is computed on its own candles and then forward-filled onto the primary
//! index without lookahead: a coarse candle only becomes visible once it has
//! closed.

use crate::models::{Candle, Timeframe};
use chrono::{DateTime, Utc};

/// Declare one informative feed per whitelisted pair
pub fn informative_pairs(whitelist: &[String], timeframe: Timeframe) -> Vec<(String, Timeframe)> {
    whitelist
        .iter()
        .map(|pair| (pair.clone(), timeframe))
        .collect()
}

/// Aggregate candles into a coarser timeframe
///
/// Buckets start on multiples of the timeframe since the Unix epoch. The
/// input must be time-ordered. The last bucket may be incomplete.
pub fn resample(candles: &[Candle], timeframe: Timeframe) -> Vec<Candle> {
    let bucket_secs = timeframe.seconds();
    let mut out: Vec<Candle> = Vec::new();

    for candle in candles {
        let bucket = candle.timestamp.timestamp().div_euclid(bucket_secs) * bucket_secs;
        let Some(bucket_start) = DateTime::<Utc>::from_timestamp(bucket, 0) else {
            continue;
        };

        match out.last_mut() {
            Some(last) if last.timestamp == bucket_start => {
                last.high = last.high.max(candle.high);
                last.low = last.low.min(candle.low);
                last.close = candle.close;
                last.volume += candle.volume;
            }
            _ => out.push(Candle {
                timestamp: bucket_start,
                ..candle.clone()
            }),
        }
    }

    out
}

/// Forward-fill an informative series onto primary timestamps
///
/// A primary candle stamped `t` closes at `t + primary_tf`; it sees the
/// latest informative point whose candle closed by then
/// (`ts + informative_tf <= t + primary_tf`). Both inputs must be
/// time-ordered. Missing informative values keep the last known value.
pub fn merge_informative(
    primary: &[DateTime<Utc>],
    primary_tf: Timeframe,
    informative: &[(DateTime<Utc>, Option<f64>)],
    informative_tf: Timeframe,
) -> Vec<Option<f64>> {
    let mut merged = Vec::with_capacity(primary.len());
    let mut next = 0;
    let mut current = None;

    for ts in primary {
        let primary_close = *ts + primary_tf.duration();

        while next < informative.len()
            && informative[next].0 + informative_tf.duration() <= primary_close
        {
            if let Some(value) = informative[next].1.filter(|v| v.is_finite()) {
                current = Some(value);
            }
            next += 1;
        }

        merged.push(current);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    fn candle(ts: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            pair: "BTC/USDT:USDT".to_string(),
            timestamp: ts,
            open,
            high,
            low,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn test_informative_pairs() {
        let whitelist = vec!["BTC/USDT:USDT".to_string(), "ETH/USDT:USDT".to_string()];
        let pairs = informative_pairs(&whitelist, Timeframe::H1);

        assert_eq!(
            pairs,
            vec![
                ("BTC/USDT:USDT".to_string(), Timeframe::H1),
                ("ETH/USDT:USDT".to_string(), Timeframe::H1),
            ]
        );
    }

    #[test]
    fn test_resample_to_hour() {
        let mut candles = Vec::new();
        for i in 0..24 {
            let ts = at(10, 0) + Duration::minutes(5 * i);
            let price = 100.0 + i as f64;
            candles.push(candle(ts, price, price + 2.0, price - 2.0, price + 1.0));
        }

        let hourly = resample(&candles, Timeframe::H1);

        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].timestamp, at(10, 0));
        assert_eq!(hourly[0].open, 100.0);
        assert_eq!(hourly[0].high, 113.0);
        assert_eq!(hourly[0].low, 98.0);
        assert_eq!(hourly[0].close, 112.0);
        assert_eq!(hourly[0].volume, 120.0);
        assert_eq!(hourly[1].timestamp, at(11, 0));
        assert_eq!(hourly[1].open, 112.0);
    }

    #[test]
    fn test_merge_waits_for_informative_close() {
        let informative = vec![
            (at(9, 0), Some(40.0)),
            (at(10, 0), Some(60.0)),
            (at(11, 0), Some(65.0)),
        ];
        let primary = vec![at(9, 50), at(10, 0), at(10, 50), at(10, 55), at(11, 55)];

        let merged = merge_informative(&primary, Timeframe::M5, &informative, Timeframe::H1);

        assert_eq!(merged, vec![None, Some(40.0), Some(40.0), Some(60.0), Some(65.0)]);
    }

    #[test]
    fn test_merge_forward_fills_gaps() {
        let informative = vec![
            (at(8, 0), None),
            (at(9, 0), Some(55.0)),
            (at(10, 0), Some(f64::NAN)),
        ];
        let primary = vec![at(9, 55), at(10, 55), at(12, 0)];

        let merged = merge_informative(&primary, Timeframe::M5, &informative, Timeframe::H1);

        assert_eq!(merged, vec![Some(55.0), Some(55.0), Some(55.0)]);
    }

    #[test]
    fn test_merge_without_informative_data() {
        let primary = vec![at(10, 0), at(10, 5)];
        let merged = merge_informative(&primary, Timeframe::M5, &[], Timeframe::H1);

        assert_eq!(merged, vec![None, None]);
    }
}
