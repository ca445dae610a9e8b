use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use fairprice_market_data::{
    DataFetcher, FetchRequest, FetchWindow, Interval, MarketDataError, PriceSeries,
};
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use super::{Snapshot, SnapshotParts};
use crate::alignment::TimeSeriesAligner;
use crate::constants::{
    ALIGNMENT_TOLERANCE_MINUTES, DOMESTIC_SYMBOL_SUFFIX, DOMESTIC_TIMEZONE, TARGET_HOUR,
    TARGET_MINUTE,
};
use crate::delay::{DelayPolicy, DelayState};
use crate::errors::{Error, Result};
use crate::reference::TickerPair;

/// Knobs for [`SnapshotResolver`].
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Domestic market timezone; defines "today" and display times.
    pub timezone: Tz,
    /// Time of day the foreign leg is anchored to.
    pub target_time: NaiveTime,
    /// Half-width of the alignment window.
    pub tolerance: Duration,
    /// Appended to domestic tickers before fetching.
    pub domestic_suffix: String,
    pub interval: Interval,
    /// Pairs resolved at once. 1 keeps resolution strictly sequential.
    pub concurrency: usize,
    pub delay_policy: DelayPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timezone: DOMESTIC_TIMEZONE,
            target_time: NaiveTime::from_hms_opt(TARGET_HOUR, TARGET_MINUTE, 0).unwrap_or_default(),
            tolerance: Duration::minutes(ALIGNMENT_TOLERANCE_MINUTES),
            domestic_suffix: DOMESTIC_SYMBOL_SUFFIX.to_string(),
            interval: Interval::default(),
            concurrency: 1,
            delay_policy: DelayPolicy::default(),
        }
    }
}

/// Pairs to resolve and the instant to resolve them at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub pairs: Vec<TickerPair>,
    pub now: DateTime<Utc>,
}

impl ResolutionRequest {
    pub fn new(pairs: Vec<TickerPair>, now: DateTime<Utc>) -> Self {
        Self { pairs, now }
    }
}

/// Outcome for one pair. `Err` only when the provider failed on both legs.
#[derive(Debug)]
pub struct PairResolution {
    pub pair: TickerPair,
    pub outcome: Result<Snapshot>,
}

impl PairResolution {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.outcome.as_ref().ok()
    }
}

/// Resolves ticker pairs into snapshots.
///
/// Per pair: decide the foreign delay, fetch both legs, align the foreign leg
/// to the target time and derive metrics. A leg with no data becomes a `None`
/// quote. A leg whose provider failed is also left `None` and its error kept
/// on the snapshot; the pair fails only when both legs failed, and never the
/// batch.
pub struct SnapshotResolver {
    fetcher: Arc<DataFetcher>,
    config: ResolverConfig,
    aligner: TimeSeriesAligner,
}

impl SnapshotResolver {
    pub fn new(fetcher: Arc<DataFetcher>, config: ResolverConfig) -> Self {
        let aligner = TimeSeriesAligner::new(config.timezone, config.tolerance);
        Self {
            fetcher,
            config,
            aligner,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves every pair, returning results in request order.
    pub async fn resolve(&self, request: ResolutionRequest) -> Vec<PairResolution> {
        let ResolutionRequest { pairs, now } = request;
        info!(
            "Resolving {} pair(s) at {}",
            pairs.len(),
            now.with_timezone(&self.config.timezone).format("%Y-%m-%d %H:%M:%S")
        );

        if self.config.concurrency <= 1 {
            let mut resolutions = Vec::with_capacity(pairs.len());
            for pair in pairs {
                resolutions.push(self.resolve_one(pair, now).await);
            }
            resolutions
        } else {
            stream::iter(pairs)
                .map(|pair| self.resolve_one(pair, now))
                .buffered(self.config.concurrency)
                .collect()
                .await
        }
    }

    async fn resolve_one(&self, pair: TickerPair, now: DateTime<Utc>) -> PairResolution {
        let outcome = self.resolve_pair(&pair, now).await;
        if let Err(e) = &outcome {
            error!("Failed to resolve {}: {}", pair.domestic_symbol, e);
        }
        PairResolution { pair, outcome }
    }

    pub async fn resolve_pair(&self, pair: &TickerPair, now: DateTime<Utc>) -> Result<Snapshot> {
        let today = now.with_timezone(&self.config.timezone).date_naive();
        let window = FetchWindow::single_day(today);
        let foreign_delay = self.config.delay_policy.delay_state(now);
        debug!(
            "{}: foreign feed {}",
            pair.domestic_symbol,
            foreign_delay.as_str()
        );

        let domestic_symbol = format!("{}{}", pair.domestic_symbol, self.config.domestic_suffix);
        let domestic = self
            .fetch_leg(self.request(&domestic_symbol, window, true, now))
            .await;
        let foreign = self
            .fetch_leg(self.request(
                &pair.foreign_symbol,
                window,
                foreign_delay.is_delayed(),
                now,
            ))
            .await;

        // One failed leg still yields a snapshot; both failing fails the pair.
        let (domestic, foreign) = match (domestic, foreign) {
            (Err(e), Err(_)) => return Err(Error::MarketData(e)),
            legs => legs,
        };
        let mut leg_errors = Vec::new();
        let domestic = absorb_leg_error(domestic, &mut leg_errors);
        let foreign = absorb_leg_error(foreign, &mut leg_errors);

        let domestic_quote = domestic
            .as_ref()
            .and_then(|series| self.aligner.latest(series, DelayState::Delayed));
        let foreign_quote_now = foreign
            .as_ref()
            .and_then(|series| self.aligner.latest(series, foreign_delay));
        let foreign_quote_at_target = foreign.as_ref().and_then(|series| {
            self.aligner
                .nearest_at(series, self.config.target_time, today, foreign_delay)
        });

        if foreign.is_some() && foreign_quote_at_target.is_none() {
            debug!(
                "{}: no sample within {} min of {}",
                pair.foreign_symbol,
                self.aligner.tolerance().num_minutes(),
                self.config.target_time.format("%H:%M")
            );
        }

        Ok(Snapshot::new(SnapshotParts {
            ratio: pair.ratio,
            domestic_quote,
            domestic_days_back: domestic.as_ref().map(|s| s.days_back),
            foreign_quote_at_target,
            foreign_quote_now,
            foreign_days_back: foreign.as_ref().map(|s| s.days_back),
            foreign_delay_state: foreign_delay,
            leg_errors,
        }))
    }

    fn request(
        &self,
        symbol: &str,
        window: FetchWindow,
        apply_delay: bool,
        now: DateTime<Utc>,
    ) -> FetchRequest {
        FetchRequest::new(symbol, window, self.config.timezone)
            .with_interval(self.config.interval)
            .with_delay(apply_delay)
            .with_now(now)
    }

    /// `Ok(None)` when the budget ran out without data.
    async fn fetch_leg(
        &self,
        request: FetchRequest,
    ) -> std::result::Result<Option<PriceSeries>, MarketDataError> {
        match self.fetcher.fetch(&request).await {
            Ok(series) => Ok(Some(series)),
            Err(e @ MarketDataError::NoData { .. }) => {
                warn!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn absorb_leg_error(
    leg: std::result::Result<Option<PriceSeries>, MarketDataError>,
    errors: &mut Vec<String>,
) -> Option<PriceSeries> {
    match leg {
        Ok(series) => series,
        Err(e) => {
            warn!("{}", e);
            errors.push(e.to_string());
            None
        }
    }
}
