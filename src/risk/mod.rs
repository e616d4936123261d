// Risk parameter module
pub mod leverage;
pub mod roi;
pub mod stoploss;

pub use leverage::{LeverageRequest, VolatilitySnapshot};
pub use roi::MinimalRoi;
pub use stoploss::{StoplossRequest, TrailingStop};
