//! Tabular summary of resolved pairs.

mod summary;

pub use summary::{format_amount, summary_file_name, write_summary, write_summary_file, SummaryRow};
