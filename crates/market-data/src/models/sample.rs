use chrono::{DateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// One close price observed at an instant.
///
/// The price is always strictly positive; construction rejects anything else.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Result<Self, MarketDataError> {
        if price <= Decimal::ZERO {
            return Err(MarketDataError::ValidationFailed {
                message: format!("Non-positive price {} at {}", price, timestamp),
            });
        }
        Ok(Self { timestamp, price })
    }

    /// Builds a sample from a raw provider bar (unix seconds, float close).
    pub fn from_raw(unix_seconds: i64, close: f64) -> Result<Self, MarketDataError> {
        let timestamp = Utc.timestamp_opt(unix_seconds, 0).single().ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", unix_seconds),
            }
        })?;

        if !close.is_finite() {
            return Err(MarketDataError::ValidationFailed {
                message: format!("Non-finite close at {}", timestamp),
            });
        }

        let price = Decimal::from_f64(close).ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Failed to convert close price {} to Decimal", close),
        })?;

        Self::new(timestamp, price)
    }
}
