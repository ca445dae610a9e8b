use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::delay::DelayState;
use crate::pricing::{DerivedMetrics, PriceInputs};

/// One resolved observation, timestamped in the domestic timezone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: Decimal,
    pub timestamp: DateTime<Tz>,
    pub delay_state: DelayState,
}

impl Quote {
    /// Local time of day, `HH:MM:SS`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Everything the resolver gathered for one pair, before metrics are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotParts {
    pub ratio: Decimal,
    pub domestic_quote: Option<Quote>,
    pub domestic_days_back: Option<u32>,
    pub foreign_quote_at_target: Option<Quote>,
    pub foreign_quote_now: Option<Quote>,
    pub foreign_days_back: Option<u32>,
    pub foreign_delay_state: DelayState,
    /// Provider failures for a leg that was left empty.
    pub leg_errors: Vec<String>,
}

/// Result for one ticker pair. Built once, never mutated.
///
/// Missing quotes and metrics are `None`, never zero. `days_back` values are
/// `Some(n)` with `n > 0` when a previous day's data had to be used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    domestic_quote: Option<Quote>,
    foreign_quote_at_target: Option<Quote>,
    foreign_quote_now: Option<Quote>,
    #[serde(flatten)]
    metrics: DerivedMetrics,
    ratio: Decimal,
    domestic_days_back: Option<u32>,
    foreign_days_back: Option<u32>,
    foreign_delay_state: DelayState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    leg_errors: Vec<String>,
}

impl Snapshot {
    pub fn new(parts: SnapshotParts) -> Self {
        let mut snapshot = Self {
            domestic_quote: parts.domestic_quote,
            foreign_quote_at_target: parts.foreign_quote_at_target,
            foreign_quote_now: parts.foreign_quote_now,
            metrics: DerivedMetrics::default(),
            ratio: parts.ratio,
            domestic_days_back: parts.domestic_days_back,
            foreign_days_back: parts.foreign_days_back,
            foreign_delay_state: parts.foreign_delay_state,
            leg_errors: parts.leg_errors,
        };
        snapshot.metrics = DerivedMetrics::compute(&snapshot.inputs());
        snapshot
    }

    pub fn domestic_quote(&self) -> Option<&Quote> {
        self.domestic_quote.as_ref()
    }

    pub fn foreign_quote_at_target(&self) -> Option<&Quote> {
        self.foreign_quote_at_target.as_ref()
    }

    pub fn foreign_quote_now(&self) -> Option<&Quote> {
        self.foreign_quote_now.as_ref()
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn theoretical_price(&self) -> Option<Decimal> {
        self.metrics.theoretical_price
    }

    pub fn implied_rate_at_target(&self) -> Option<Decimal> {
        self.metrics.implied_rate_at_target
    }

    pub fn implied_rate_now(&self) -> Option<Decimal> {
        self.metrics.implied_rate_now
    }

    pub fn ratio(&self) -> Decimal {
        self.ratio
    }

    pub fn domestic_days_back(&self) -> Option<u32> {
        self.domestic_days_back
    }

    pub fn foreign_days_back(&self) -> Option<u32> {
        self.foreign_days_back
    }

    pub fn foreign_delay_state(&self) -> DelayState {
        self.foreign_delay_state
    }

    pub fn leg_errors(&self) -> &[String] {
        &self.leg_errors
    }

    /// Whether either leg fell back to an earlier day.
    pub fn uses_stale_data(&self) -> bool {
        self.domestic_days_back.unwrap_or(0) > 0 || self.foreign_days_back.unwrap_or(0) > 0
    }

    /// Prices as plain numbers, ready to be combined with manual entries.
    pub fn inputs(&self) -> PriceInputs {
        PriceInputs {
            domestic_price: self.domestic_quote.as_ref().map(|q| q.price),
            foreign_price_at_target: self.foreign_quote_at_target.as_ref().map(|q| q.price),
            foreign_price_now: self.foreign_quote_now.as_ref().map(|q| q.price),
            ratio: self.ratio,
        }
    }
}
