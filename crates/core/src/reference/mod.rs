//! Ticker pair reference table.

mod reference_errors;
mod ticker_table;

pub use reference_errors::ReferenceTableError;
pub use ticker_table::{ReferenceTable, TickerPair, TickerSelection};
