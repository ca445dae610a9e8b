//! Fairprice Market Data Crate
//!
//! Provider-agnostic acquisition of intraday close prices for one symbol at a
//! time, with bounded retries and calendar-day fallback.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   FetchRequest   |  (symbol, date window, timezone, delay flag)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   DataFetcher    |  (attempts per window, fallback days, delay filter)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |     Provider     |  (Yahoo Finance)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   PriceSeries    |  (ordered samples, days_back)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceSample`] - One close price at an instant
//! - [`PriceSeries`] - Ordered samples for a symbol plus how stale they are
//! - [`FetchWindow`] - `[start, end)` calendar-date window
//! - [`FetchPolicy`] - Retry and fallback budget
//! - [`DataFetcher`] - Runs the budget against a provider

pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};

pub use models::{FetchWindow, Interval, PriceSample, PriceSeries};

pub use fetcher::{
    AttemptOutcome, Clock, DataFetcher, FetchDiagnostics, FetchPolicy, FetchRequest, FixedClock,
    Sleeper, SystemClock, TokioSleeper, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BACKOFF,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DAY_FALLBACK, REGULATORY_DELAY_MINUTES,
};

pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;
