/// Moving Average Convergence Divergence (MACD)
///
/// - MACD line: EMA(fast) - EMA(slow) of the close
/// - Signal line: EMA(signal) of the MACD line
///
/// MACD above its signal line is read as bullish, below as bearish.
use super::moving_average::calculate_ema_series;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// Calculate MACD for every price, aligned with the input
///
/// The line starts at index `slow - 1`, the signal line `signal - 1`
/// candles later.
pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let n = prices.len();
    let fast_ema = calculate_ema_series(prices, fast);
    let slow_ema = calculate_ema_series(prices, slow);

    let macd: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let mut signal_line = vec![None; n];
    if let Some(start) = macd.iter().position(Option::is_some) {
        // Once defined, the line stays defined
        let defined: Vec<f64> = macd[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
        for (offset, value) in calculate_ema_series(&defined, signal).into_iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    MacdSeries {
        macd,
        signal: signal_line,
    }
}
