//! Core analytics: pure functions over in-memory series.

pub mod analysis;
pub mod classifier;
pub mod config_validation;
pub mod error;
pub mod fuzzy;
pub mod macro_data;
pub mod portfolio;
pub mod profit;
pub mod segmentation;
pub mod series;
pub mod sma;
pub mod ticker;
