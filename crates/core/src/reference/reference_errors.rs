use thiserror::Error;

/// Problems found while loading the reference table.
#[derive(Error, Debug)]
pub enum ReferenceTableError {
    #[error("Failed to read reference table: {0}")]
    Read(#[from] csv::Error),

    #[error("Row {row}: empty ticker")]
    EmptyTicker { row: usize },

    #[error("Row {row}: invalid ratio '{value}' for {symbol}")]
    InvalidRatio {
        row: usize,
        symbol: String,
        value: String,
    },

    #[error("Row {row}: duplicate domestic ticker {symbol}")]
    DuplicateTicker { row: usize, symbol: String },
}
