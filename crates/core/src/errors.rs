//! Core error types for the fairprice engine.
//!
//! Missing data is not an error here: absent quotes and metrics are modelled
//! as `None`. These variants cover what cannot be absorbed that way.

use thiserror::Error;

use crate::reference::ReferenceTableError;
use fairprice_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Reference table error: {0}")]
    ReferenceTable(#[from] ReferenceTableError),

    #[error("Failed to write summary: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
