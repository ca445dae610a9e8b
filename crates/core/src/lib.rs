//! Fairprice Core - fair-price resolution for cross-listed securities.
//!
//! Aligns a delayed domestic quote with a foreign quote at a target time of
//! day and at the present moment, then derives a theoretical domestic price
//! and implied exchange rates. Data acquisition lives in
//! `fairprice-market-data`; this crate decides delays, aligns series and
//! assembles [`Snapshot`]s.

pub mod alignment;
pub mod constants;
pub mod delay;
pub mod errors;
pub mod export;
pub mod pricing;
pub mod reference;
pub mod snapshot;

pub use alignment::TimeSeriesAligner;
pub use delay::{DelayPolicy, DelayState};
pub use pricing::{DerivedMetrics, PriceCalculator, PriceDifference, PriceInputs};
pub use reference::{ReferenceTable, TickerPair, TickerSelection};
pub use snapshot::{
    PairResolution, Quote, ResolutionRequest, ResolverConfig, Snapshot, SnapshotResolver,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
