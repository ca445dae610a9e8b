//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait the fetcher calls for raw bars
//! - The Yahoo Finance implementation used in production
//!
//! Providers are black boxes to the rest of the crate: they may return an
//! empty vector, a `NoDataForRange`/`SymbolNotFound` error, or a transport
//! failure, and the fetcher handles all three the same way for retry purposes.

mod traits;

pub mod yahoo;

pub use traits::MarketDataProvider;
