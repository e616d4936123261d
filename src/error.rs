use thiserror::Error;

/// Errors raised while loading data or configuration.
///
/// Signal decisions themselves never fail; missing indicator values resolve
/// to the conservative outcome instead of an error.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid timeframe '{0}' (expected e.g. 5m, 1h, 1d)")]
    InvalidTimeframe(String),

    #[error("candles are not strictly time-ordered at index {index} ({previous} >= {current})")]
    UnorderedCandles {
        index: usize,
        previous: chrono::DateTime<chrono::Utc>,
        current: chrono::DateTime<chrono::Utc>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
