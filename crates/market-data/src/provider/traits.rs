//! Market data provider trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MarketDataError;
use crate::models::{Interval, PriceSample};

/// Trait for minute-resolution market data providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use fairprice_market_data::provider::MarketDataProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_bars(&self, symbol: &str, start, end, interval)
///         -> Result<Vec<PriceSample>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch close-price bars for `symbol` in `[start, end)`.
    ///
    /// Samples should be ordered by timestamp ascending. An empty vector is a
    /// valid answer and means "no data yet".
    async fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PriceSample>, MarketDataError>;
}
