//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the fetcher reports an exhausted budget.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider returned no bars for the requested window.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// A single attempt exceeded the configured attempt timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// Nothing retrievable within the retry/fallback budget.
    ///
    /// Covers empty responses as well as series that became empty after the
    /// regulatory delay filter. Callers treat this as a missing quote.
    #[error("No data for {symbol} after {attempts} attempts")]
    NoData {
        /// Symbol that was requested
        symbol: String,
        /// Number of provider calls made before giving up
        attempts: u32,
    },

    /// Every attempt in the budget failed inside the provider itself.
    #[error("Provider failed for {symbol} after {attempts} attempts: {last_error}")]
    ProviderExhausted {
        /// Symbol that was requested
        symbol: String,
        /// Number of provider calls made before giving up
        attempts: u32,
        /// Message of the last provider failure
        last_error: String,
    },
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use fairprice_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "YAHOO".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Transient);
    ///
    /// let error = MarketDataError::NoDataForRange;
    /// assert_eq!(error.retry_class(), RetryClass::Empty);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolNotFound(_) | Self::NoDataForRange => RetryClass::Empty,

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::ValidationFailed { .. } => RetryClass::Transient,

            Self::NoData { .. } | Self::ProviderExhausted { .. } => RetryClass::Terminal,
        }
    }

    /// True for the "nothing retrievable" outcome that callers absorb into a
    /// missing quote.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
