//! Retry and day-fallback acquisition on top of a [`MarketDataProvider`].
//!
//! [`MarketDataProvider`]: crate::provider::MarketDataProvider

mod clock;
mod data_fetcher;
mod diagnostics;
mod policy;

pub use clock::{Clock, FixedClock, Sleeper, SystemClock, TokioSleeper};
pub use data_fetcher::{DataFetcher, FetchRequest};
pub use diagnostics::{AttemptOutcome, FetchAttempt, FetchDiagnostics, FetchState};
pub use policy::{
    FetchPolicy, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DAY_FALLBACK, REGULATORY_DELAY_MINUTES,
};
