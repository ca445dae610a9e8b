//! Locating samples in a price series by time of day.

mod time_series_aligner;

pub use time_series_aligner::TimeSeriesAligner;
