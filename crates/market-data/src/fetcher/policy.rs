use std::time::Duration;

/// Default number of provider calls per date window.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default number of date windows tried (today plus four days back).
pub const DEFAULT_MAX_DAY_FALLBACK: u32 = 5;

/// Default fixed pause between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Default cap on a single provider call.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Regulatory delay simulated on delayed feeds.
pub const REGULATORY_DELAY_MINUTES: i64 = 20;

/// Retry and fallback budget for one symbol fetch.
///
/// Backoff is fixed, not exponential: every pause lasts `backoff`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    /// Provider calls per date window. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Date windows tried, shifting back one day each time. Values below 1
    /// are treated as 1.
    pub max_day_fallback: u32,
    /// Pause between consecutive attempts.
    pub backoff: Duration,
    /// Upper bound for one provider call; `None` waits indefinitely.
    pub attempt_timeout: Option<Duration>,
    /// Samples newer than `now - regulatory_delay` are dropped when the
    /// request asks for delay.
    pub regulatory_delay: chrono::Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_day_fallback: DEFAULT_MAX_DAY_FALLBACK,
            backoff: DEFAULT_BACKOFF,
            attempt_timeout: Some(DEFAULT_ATTEMPT_TIMEOUT),
            regulatory_delay: chrono::Duration::minutes(REGULATORY_DELAY_MINUTES),
        }
    }
}

impl FetchPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_day_fallback(mut self, max_day_fallback: u32) -> Self {
        self.max_day_fallback = max_day_fallback;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Option<Duration>) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn attempts_per_window(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn day_windows(&self) -> u32 {
        self.max_day_fallback.max(1)
    }

    /// Total provider calls before the fetch gives up.
    pub fn total_attempts(&self) -> u32 {
        self.attempts_per_window()
            .saturating_mul(self.day_windows())
    }

    /// Longest a single fetch can take when every call hits its timeout.
    ///
    /// Returns `None` when there is no attempt timeout, since a provider call
    /// can then block forever.
    pub fn worst_case_duration(&self) -> Option<Duration> {
        let per_attempt = self.attempt_timeout?;
        let attempts = self.total_attempts();
        let pauses = attempts.saturating_sub(1);
        Some(per_attempt * attempts + self.backoff * pauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let policy = FetchPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.max_day_fallback, 5);
        assert_eq!(policy.backoff, Duration::from_secs(1));
        assert_eq!(policy.total_attempts(), 15);
        assert_eq!(policy.regulatory_delay, chrono::Duration::minutes(20));
    }

    #[test]
    fn test_worst_case_duration() {
        let policy = FetchPolicy::default()
            .with_attempt_timeout(Some(Duration::from_secs(2)))
            .with_backoff(Duration::from_secs(1));
        // 15 calls of 2s plus 14 pauses of 1s
        assert_eq!(policy.worst_case_duration(), Some(Duration::from_secs(44)));

        let unbounded = policy.with_attempt_timeout(None);
        assert_eq!(unbounded.worst_case_duration(), None);
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        let policy = FetchPolicy::default()
            .with_max_attempts(0)
            .with_max_day_fallback(0);
        assert_eq!(policy.total_attempts(), 1);
    }
}
