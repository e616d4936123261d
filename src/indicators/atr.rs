/// Average True Range (ATR) indicator
///
/// Measures market volatility by calculating the average of true ranges over a period.
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// Uses Wilder's smoothing (same as RSI) for the moving average.

use crate::models::Candle;

/// True ranges starting from the second candle
fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let high = w[1].high;
            let low = w[1].low;
            let prev_close = w[0].close;

            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect()
}

/// Calculate the ATR series aligned with `candles`
///
/// The first value sits at index `period` (it needs `period` true ranges,
/// and the first true range needs a previous close).
pub fn calculate_atr_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut series = vec![None; candles.len()];
    if period == 0 || candles.len() < period + 1 {
        return series;
    }

    let true_ranges = true_ranges(candles);

    // First ATR is simple average of first 'period' true ranges
    let mut atr: f64 = true_ranges[..period].iter().sum::<f64>() / period as f64;
    series[period] = Some(atr);

    // Apply Wilder's smoothing for subsequent values
    for (i, tr) in true_ranges.iter().enumerate().skip(period) {
        atr = (atr * (period as f64 - 1.0) + tr) / period as f64;
        series[i + 1] = Some(atr);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
        calculate_atr_series(candles, period).last().copied().flatten()
    }

    fn create_test_candles(prices: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                pair: "TEST/USDT".to_string(),
                timestamp: Utc::now() + chrono::Duration::minutes(5 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_calculate_atr() {
        // Low volatility market
        let low_vol_prices = vec![(100.0, 101.0, 99.0, 100.0); 15];

        let candles = create_test_candles(&low_vol_prices);
        let atr = calculate_atr(&candles, 14);

        assert!(atr.is_some());
        // ATR should be around 2.0 (high-low range)
        assert!(atr.unwrap() > 1.5 && atr.unwrap() < 2.5);
    }

    #[test]
    fn test_calculate_atr_high_volatility() {
        // High volatility market with gaps
        let high_vol_prices = vec![
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 110.0, 98.0, 105.0),
            (105.0, 108.0, 92.0, 95.0),
            (95.0, 103.0, 88.0, 100.0),
            (100.0, 115.0, 97.0, 110.0),
            (110.0, 112.0, 95.0, 98.0),
            (98.0, 108.0, 90.0, 105.0),
            (105.0, 120.0, 100.0, 115.0),
            (115.0, 118.0, 105.0, 110.0),
            (110.0, 125.0, 108.0, 120.0),
            (120.0, 130.0, 115.0, 125.0),
            (125.0, 128.0, 110.0, 115.0),
            (115.0, 122.0, 105.0, 118.0),
            (118.0, 130.0, 115.0, 125.0),
            (125.0, 135.0, 120.0, 130.0),
        ];

        let candles = create_test_candles(&high_vol_prices);
        let atr = calculate_atr(&candles, 14);

        assert!(atr.is_some());
        // ATR should be higher for volatile market
        assert!(atr.unwrap() > 10.0);
    }

    #[test]
    fn test_atr_expands_on_volatility_spike() {
        // 20 candles with low volatility, then 5 wide ones
        let mut prices = vec![(100.0, 101.0, 99.0, 100.0); 20];
        prices.extend(vec![(100.0, 110.0, 90.0, 105.0); 5]);

        let candles = create_test_candles(&prices);
        let series = calculate_atr_series(&candles, 14);

        let before = series[19].unwrap();
        let after = series[24].unwrap();
        assert!(after > before * 2.0);
    }

    #[test]
    fn test_insufficient_data() {
        let prices = vec![(100.0, 101.0, 99.0, 100.0), (100.0, 101.0, 99.0, 100.0)];

        let candles = create_test_candles(&prices);
        let atr = calculate_atr(&candles, 14);

        assert!(atr.is_none());
    }

    #[test]
    fn test_atr_series() {
        let prices = vec![(100.0, 105.0, 95.0, 100.0); 16];

        let candles = create_test_candles(&prices);
        let atr_series = calculate_atr_series(&candles, 14);

        // Aligned with candles, first value once 14 true ranges exist
        assert_eq!(atr_series.len(), 16);
        assert!(atr_series[..14].iter().all(Option::is_none));
        assert_eq!(atr_series[14], Some(10.0));
        assert_eq!(atr_series[15], Some(10.0));
    }
}
