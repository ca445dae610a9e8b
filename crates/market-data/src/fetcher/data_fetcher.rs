use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};

use super::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use super::diagnostics::{AttemptOutcome, FetchDiagnostics, FetchState};
use super::FetchPolicy;
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{FetchWindow, Interval, PriceSeries};
use crate::provider::MarketDataProvider;

/// What to fetch for one symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub symbol: String,
    /// Window tried first; fallback days shift it back.
    pub window: FetchWindow,
    /// Timezone the window dates are expressed in.
    pub timezone: Tz,
    pub interval: Interval,
    /// Drop samples newer than `now - regulatory_delay`.
    pub apply_delay: bool,
    /// Instant the delay cutoff is measured from. Falls back to the
    /// fetcher's clock when unset.
    pub now: Option<DateTime<Utc>>,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, window: FetchWindow, timezone: Tz) -> Self {
        Self {
            symbol: symbol.into(),
            window,
            timezone,
            interval: Interval::OneMinute,
            apply_delay: false,
            now: None,
        }
    }

    pub fn with_delay(mut self, apply_delay: bool) -> Self {
        self.apply_delay = apply_delay;
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

/// Retrieves a price series with bounded retries and day fallback.
///
/// Each date window gets `max_attempts` provider calls separated by a fixed
/// pause. A call that fails, returns nothing, or returns only samples newer
/// than the delay cutoff counts as "no data yet". Once a window's attempts are
/// spent, the window moves back one calendar day.
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    policy: FetchPolicy,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, policy: FetchPolicy) -> Self {
        Self {
            provider,
            policy,
            clock: Arc::new(SystemClock),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Fetch a series, failing with `NoData` or `ProviderExhausted` once the
    /// budget is spent.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, MarketDataError> {
        self.fetch_with_diagnostics(request).await.0
    }

    /// Same as [`fetch`](Self::fetch) but also returns every attempt made.
    pub async fn fetch_with_diagnostics(
        &self,
        request: &FetchRequest,
    ) -> (Result<PriceSeries, MarketDataError>, FetchDiagnostics) {
        let mut diagnostics = FetchDiagnostics::new();
        let mut found: Option<PriceSeries> = None;
        let mut state = FetchState::INITIAL;

        loop {
            state = match state {
                FetchState::TryAttempt { days_back, attempt } => {
                    let window = request.window.shifted_back(days_back);
                    let (outcome, series) = self.attempt(request, window).await;
                    debug!(
                        "{} window {}..{} attempt {}: {:?}",
                        request.symbol,
                        window.start,
                        window.end,
                        attempt + 1,
                        outcome
                    );
                    diagnostics.record(days_back, attempt, outcome);

                    let succeeded = series.is_some();
                    found = series;
                    FetchState::after_attempt(days_back, attempt, succeeded, &self.policy)
                }
                FetchState::RetryAttempt { days_back, attempt } => {
                    self.sleeper.sleep(self.policy.backoff).await;
                    FetchState::TryAttempt { days_back, attempt }
                }
                FetchState::FallbackDay { days_back } => {
                    debug!(
                        "{}: no data in window, falling back {} day(s)",
                        request.symbol, days_back
                    );
                    self.sleeper.sleep(self.policy.backoff).await;
                    FetchState::TryAttempt {
                        days_back,
                        attempt: 0,
                    }
                }
                FetchState::Success { days_back } => {
                    let result = match found.take() {
                        Some(series) => {
                            if days_back > 0 {
                                info!(
                                    "Using data from {} for {} as current date data is not available",
                                    series.window.start.format("%Y-%m-%d"),
                                    request.symbol
                                );
                            }
                            Ok(series.with_days_back(days_back))
                        }
                        None => Err(self.exhausted(request, &diagnostics)),
                    };
                    return (result, diagnostics);
                }
                FetchState::Failed => {
                    let error = self.exhausted(request, &diagnostics);
                    warn!("{} ({})", error, diagnostics.summary());
                    return (Err(error), diagnostics);
                }
            };
        }
    }

    /// One provider call against one window.
    async fn attempt(
        &self,
        request: &FetchRequest,
        window: FetchWindow,
    ) -> (AttemptOutcome, Option<PriceSeries>) {
        let (start, end) = window.bounds_utc(request.timezone);
        let call = self
            .provider
            .get_bars(&request.symbol, start, end, request.interval);

        let result = match self.policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::Timeout {
                    provider: self.provider.id().to_string(),
                }),
            },
            None => call.await,
        };

        let samples = match result {
            Ok(samples) => samples,
            Err(e) => {
                return match e.retry_class() {
                    RetryClass::Empty => (AttemptOutcome::Empty, None),
                    RetryClass::Transient | RetryClass::Terminal => {
                        (AttemptOutcome::Failed(e.to_string()), None)
                    }
                };
            }
        };

        if samples.is_empty() {
            return (AttemptOutcome::Empty, None);
        }

        let mut series = PriceSeries::new(request.symbol.clone(), window, samples);
        if request.apply_delay {
            let raw = series.len();
            let now = request.now.unwrap_or_else(|| self.clock.now());
            let cutoff = now - self.policy.regulatory_delay;
            series.retain_not_after(cutoff);
            if series.is_empty() {
                return (AttemptOutcome::DelayFiltered { raw }, None);
            }
        }

        (AttemptOutcome::Bars(series.len()), Some(series))
    }

    fn exhausted(&self, request: &FetchRequest, diagnostics: &FetchDiagnostics) -> MarketDataError {
        let attempts = diagnostics.attempt_count();
        match diagnostics.last_error() {
            Some(last_error) if !diagnostics.saw_empty_response() => {
                MarketDataError::ProviderExhausted {
                    symbol: request.symbol.clone(),
                    attempts,
                    last_error: last_error.to_string(),
                }
            }
            _ => MarketDataError::NoData {
                symbol: request.symbol.clone(),
                attempts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::clock::FixedClock;
    use crate::models::PriceSample;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::time::Duration;

    type Responder =
        dyn Fn(usize, DateTime<Utc>) -> Result<Vec<PriceSample>, MarketDataError> + Send + Sync;

    /// Provider whose answer depends on the call index and window start.
    struct ScriptedProvider {
        responder: Box<Responder>,
        calls: Mutex<Vec<DateTime<Utc>>>,
    }

    impl ScriptedProvider {
        fn new(
            responder: impl Fn(usize, DateTime<Utc>) -> Result<Vec<PriceSample>, MarketDataError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MarketDataProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "SCRIPTED"
        }

        async fn get_bars(
            &self,
            _symbol: &str,
            start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _interval: Interval,
        ) -> Result<Vec<PriceSample>, MarketDataError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(start);
                calls.len() - 1
            };
            (self.responder)(index, start)
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn tz() -> Tz {
        chrono_tz::America::Argentina::Buenos_Aires
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    fn request() -> FetchRequest {
        FetchRequest::new("NVDA", FetchWindow::single_day(today()), tz())
    }

    /// Two bars at 17:00 and 17:01 local time on the window's day.
    fn bars_for(start: DateTime<Utc>) -> Vec<PriceSample> {
        vec![
            PriceSample::new(start + ChronoDuration::hours(17), dec!(50)).unwrap(),
            PriceSample::new(start + ChronoDuration::minutes(17 * 60 + 1), dec!(51)).unwrap(),
        ]
    }

    fn fetcher(provider: Arc<ScriptedProvider>, sleeper: Arc<RecordingSleeper>) -> DataFetcher {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 23, 0, 0).unwrap();
        DataFetcher::new(provider, FetchPolicy::default())
            .with_clock(Arc::new(FixedClock(now)))
            .with_sleeper(sleeper)
    }

    #[tokio::test]
    async fn test_first_attempt_success_has_no_pause() {
        let provider = Arc::new(ScriptedProvider::new(|_, start| Ok(bars_for(start))));
        let sleeper = Arc::new(RecordingSleeper::default());

        let series = fetcher(provider.clone(), sleeper.clone())
            .fetch(&request())
            .await
            .expect("series");

        assert_eq!(series.days_back, 0);
        assert_eq!(series.len(), 2);
        assert_eq!(series.window, FetchWindow::single_day(today()));
        assert_eq!(provider.call_count(), 1);
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_kth_day_window() {
        // 2 full windows of 3 empty attempts, then data on the third window
        let provider = Arc::new(ScriptedProvider::new(|index, start| {
            if index < 6 {
                Ok(Vec::new())
            } else {
                Ok(bars_for(start))
            }
        }));
        let sleeper = Arc::new(RecordingSleeper::default());

        let series = fetcher(provider.clone(), sleeper.clone())
            .fetch(&request())
            .await
            .expect("series");

        assert_eq!(series.days_back, 2);
        assert!(series.is_stale());
        assert_eq!(series.window.start, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(series.window.end, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(provider.call_count(), 7);

        let expected_start = Utc.with_ymd_and_hms(2024, 3, 6, 3, 0, 0).unwrap();
        assert_eq!(provider.calls.lock().unwrap()[6], expected_start);
        assert_eq!(
            series.samples()[0].timestamp,
            expected_start + ChronoDuration::hours(17)
        );
    }

    #[tokio::test]
    async fn test_always_empty_exhausts_full_budget() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| Ok(Vec::new())));
        let sleeper = Arc::new(RecordingSleeper::default());

        let (result, diagnostics) = fetcher(provider.clone(), sleeper.clone())
            .fetch_with_diagnostics(&request())
            .await;

        assert_eq!(provider.call_count(), 15);
        assert_eq!(diagnostics.attempt_count(), 15);
        assert!(matches!(
            result,
            Err(MarketDataError::NoData { ref symbol, attempts: 15 }) if symbol == "NVDA"
        ));

        let sleeps = sleeper.sleeps.lock().unwrap();
        assert_eq!(sleeps.len(), 14);
        assert!(sleeps.iter().all(|d| *d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_custom_budget_is_respected() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| {
            Err(MarketDataError::NoDataForRange)
        }));
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = FetchPolicy::default()
            .with_max_attempts(2)
            .with_max_day_fallback(3)
            .with_backoff(Duration::from_millis(250));

        let result = DataFetcher::new(provider.clone(), policy)
            .with_sleeper(sleeper.clone())
            .fetch(&request())
            .await;

        assert_eq!(provider.call_count(), 6);
        assert!(matches!(result, Err(MarketDataError::NoData { attempts: 6, .. })));
        assert_eq!(
            sleeper.sleeps.lock().unwrap().as_slice(),
            &[Duration::from_millis(250); 5]
        );
    }

    #[tokio::test]
    async fn test_transient_error_then_success_same_window() {
        let provider = Arc::new(ScriptedProvider::new(|index, start| {
            if index == 0 {
                Err(MarketDataError::ProviderError {
                    provider: "SCRIPTED".to_string(),
                    message: "502".to_string(),
                })
            } else {
                Ok(bars_for(start))
            }
        }));
        let sleeper = Arc::new(RecordingSleeper::default());

        let (result, diagnostics) = fetcher(provider.clone(), sleeper.clone())
            .fetch_with_diagnostics(&request())
            .await;

        let series = result.expect("series");
        assert_eq!(series.days_back, 0);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(sleeper.sleeps.lock().unwrap().len(), 1);
        assert!(matches!(
            diagnostics.attempts[0].outcome,
            AttemptOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_only_failures_report_provider_exhausted() {
        let provider = Arc::new(ScriptedProvider::new(|index, _| {
            Err(MarketDataError::ProviderError {
                provider: "SCRIPTED".to_string(),
                message: format!("failure {}", index),
            })
        }));
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = fetcher(provider.clone(), sleeper).fetch(&request()).await;

        match result {
            Err(MarketDataError::ProviderExhausted {
                attempts,
                last_error,
                ..
            }) => {
                assert_eq!(attempts, 15);
                assert!(last_error.contains("failure 14"));
            }
            other => panic!("expected ProviderExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delay_filtered_series_is_retried_like_empty() {
        // Clock sits one minute after the 17:01 bar, so both bars are too recent.
        let provider = Arc::new(ScriptedProvider::new(|_, start| Ok(bars_for(start))));
        let sleeper = Arc::new(RecordingSleeper::default());
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 20, 2, 0).unwrap();

        let fetcher = DataFetcher::new(provider.clone(), FetchPolicy::default())
            .with_clock(Arc::new(FixedClock(now)))
            .with_sleeper(sleeper);

        let (result, diagnostics) = fetcher
            .fetch_with_diagnostics(&request().with_delay(true))
            .await;

        // Today's window is filtered out three times, yesterday's bars are old enough.
        let series = result.expect("series");
        assert_eq!(series.days_back, 1);
        assert_eq!(provider.call_count(), 4);
        assert_eq!(
            diagnostics.attempts[0].outcome,
            AttemptOutcome::DelayFiltered { raw: 2 }
        );
    }

    #[tokio::test]
    async fn test_delay_keeps_samples_at_or_before_cutoff() {
        let provider = Arc::new(ScriptedProvider::new(|_, start| Ok(bars_for(start))));
        // 17:20 local: cutoff lands exactly on the 17:00 bar
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 20, 20, 0).unwrap();

        let series = DataFetcher::new(provider, FetchPolicy::default())
            .with_clock(Arc::new(FixedClock(now)))
            .with_sleeper(Arc::new(RecordingSleeper::default()))
            .fetch(&request().with_delay(true))
            .await
            .expect("series");

        assert_eq!(series.len(), 1);
        assert_eq!(series.last().map(|s| s.price), Some(dec!(50)));
    }

    #[tokio::test]
    async fn test_request_now_takes_precedence_over_clock() {
        let provider = Arc::new(ScriptedProvider::new(|_, start| Ok(bars_for(start))));
        // Clock is hours later; the request pins 17:20 local, so only 17:00 passes.
        let clock_now = Utc.with_ymd_and_hms(2024, 3, 9, 2, 0, 0).unwrap();
        let request_now = Utc.with_ymd_and_hms(2024, 3, 8, 20, 20, 0).unwrap();

        let series = DataFetcher::new(provider, FetchPolicy::default())
            .with_clock(Arc::new(FixedClock(clock_now)))
            .with_sleeper(Arc::new(RecordingSleeper::default()))
            .fetch(&request().with_delay(true).with_now(request_now))
            .await
            .expect("series");

        assert_eq!(series.len(), 1);
        assert_eq!(series.last().map(|s| s.price), Some(dec!(50)));
    }

    #[tokio::test]
    async fn test_without_delay_recent_samples_are_kept() {
        let provider = Arc::new(ScriptedProvider::new(|_, start| Ok(bars_for(start))));
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 20, 2, 0).unwrap();

        let series = DataFetcher::new(provider, FetchPolicy::default())
            .with_clock(Arc::new(FixedClock(now)))
            .with_sleeper(Arc::new(RecordingSleeper::default()))
            .fetch(&request())
            .await
            .expect("series");

        assert_eq!(series.len(), 2);
    }
}
