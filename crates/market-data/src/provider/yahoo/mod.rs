//! Yahoo Finance minute-bar provider.
//!
//! Fetches intraday close prices through the chart API for:
//! - Domestic listings with an exchange suffix (e.g., GGAL.BA)
//! - Foreign listings (e.g., NVDA, MSFT)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{Interval, PriceSample};
use crate::provider::MarketDataProvider;

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn map_error(symbol: &str, error: yahoo::YahooError) -> MarketDataError {
        match error {
            yahoo::YahooError::NoQuotes => MarketDataError::NoDataForRange,
            yahoo::YahooError::NoResult => MarketDataError::SymbolNotFound(symbol.to_string()),
            other => {
                let message = other.to_string();
                if Self::is_rate_limited(&message) {
                    MarketDataError::RateLimited {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message,
                    }
                }
            }
        }
    }

    /// Yahoo answers throttled requests with HTTP 429.
    fn is_rate_limited(message: &str) -> bool {
        message.contains("429") || message.to_ascii_lowercase().contains("too many requests")
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<PriceSample>, MarketDataError> {
        debug!(
            "Fetching {} bars for {} from {} to {}",
            interval,
            symbol,
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        );

        let response = self
            .connector
            .get_quote_history_interval(
                symbol,
                Self::chrono_to_offset_datetime(start),
                Self::chrono_to_offset_datetime(end),
                interval.as_str(),
            )
            .await
            .map_err(|e| Self::map_error(symbol, e))?;

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoQuotes) => return Ok(Vec::new()),
            Err(e) => return Err(Self::map_error(symbol, e)),
        };

        let samples = quotes
            .into_iter()
            .filter_map(
                |q| match PriceSample::from_raw(q.timestamp as i64, q.close) {
                    Ok(sample) => Some(sample),
                    Err(e) => {
                        warn!("Skipping {} bar due to conversion error: {}", symbol, e);
                        None
                    }
                },
            )
            .collect();

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chrono_to_offset_datetime_keeps_instant() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 4, 20, 0, 0).unwrap();
        let converted = YahooProvider::chrono_to_offset_datetime(dt);
        assert_eq!(converted.unix_timestamp(), dt.timestamp());
    }

    #[test]
    fn test_no_quotes_maps_to_empty_class() {
        let error = YahooProvider::map_error("GGAL.BA", yahoo::YahooError::NoQuotes);
        assert!(matches!(error, MarketDataError::NoDataForRange));

        let error = YahooProvider::map_error("ZZZZ", yahoo::YahooError::NoResult);
        assert!(matches!(error, MarketDataError::SymbolNotFound(ref s) if s == "ZZZZ"));
    }

    #[test]
    fn test_throttled_responses_detected() {
        assert!(YahooProvider::is_rate_limited(
            "fetching the data from yahoo! finance failed: 429 Too Many Requests"
        ));
        assert!(YahooProvider::is_rate_limited("Too Many Requests"));
        assert!(!YahooProvider::is_rate_limited("502 Bad Gateway"));
    }
}
