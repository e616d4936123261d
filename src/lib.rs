// Core modules
pub mod config;
pub mod error;
pub mod feed;
pub mod indicators;
pub mod informative;
pub mod models;
pub mod risk;
pub mod strategy;

// Re-export commonly used types
pub use crate::config::StrategyConfig;
pub use error::SignalError;
pub use models::*;
pub use strategy::{RsiMacdAtrStrategy, SignalEngine, Strategy};

// Error handling
pub type Result<T> = std::result::Result<T, SignalError>;
