//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `interval` - Bar resolution requested from a provider
//! - `sample` - A single timestamped close price (PriceSample)
//! - `series` - Ordered samples for one symbol over a date window (PriceSeries, FetchWindow)

mod interval;
mod sample;
mod series;

pub use interval::Interval;
pub use sample::PriceSample;
pub use series::{FetchWindow, PriceSeries};
