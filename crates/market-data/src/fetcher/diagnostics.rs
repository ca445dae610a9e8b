//! Attempt tracking and the fetch state machine.

use super::FetchPolicy;

/// What a single provider call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Usable bars were returned (count after delay filtering).
    Bars(usize),
    /// The provider had nothing for the window.
    Empty,
    /// Bars came back but every one was newer than the delay cutoff.
    DelayFiltered { raw: usize },
    /// The provider call itself failed.
    Failed(String),
}

/// Record of one provider call during a fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchAttempt {
    pub days_back: u32,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
}

/// Every attempt made for one symbol, in order.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<FetchAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record(&mut self, days_back: u32, attempt: u32, outcome: AttemptOutcome) {
        self.attempts.push(FetchAttempt {
            days_back,
            attempt,
            outcome,
        });
    }

    pub fn attempt_count(&self) -> u32 {
        u32::try_from(self.attempts.len()).unwrap_or(u32::MAX)
    }

    /// True if the provider ever answered without failing, even with nothing.
    pub fn saw_empty_response(&self) -> bool {
        self.attempts.iter().any(|a| {
            matches!(
                a.outcome,
                AttemptOutcome::Empty | AttemptOutcome::DelayFiltered { .. }
            )
        })
    }

    pub fn last_error(&self) -> Option<&str> {
        self.attempts.iter().rev().find_map(|a| match &a.outcome {
            AttemptOutcome::Failed(message) => Some(message.as_str()),
            _ => None,
        })
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| {
                let label = match &a.outcome {
                    AttemptOutcome::Bars(count) => format!("{} BARS", count),
                    AttemptOutcome::Empty => "EMPTY".to_string(),
                    AttemptOutcome::DelayFiltered { raw } => format!("DELAYED ({} dropped)", raw),
                    AttemptOutcome::Failed(err) => format!("ERROR ({})", err),
                };
                format!("d-{}#{}: {}", a.days_back, a.attempt + 1, label)
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Position in the retry/fallback loop.
///
/// ```text
/// TryAttempt ──success──▶ Success
///     │
///     ├─ attempts remain ──▶ RetryAttempt ──pause──▶ TryAttempt (same window)
///     ├─ days remain ──────▶ FallbackDay ──pause──▶ TryAttempt (window - 1 day)
///     └─ both spent ───────▶ Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchState {
    TryAttempt { days_back: u32, attempt: u32 },
    RetryAttempt { days_back: u32, attempt: u32 },
    FallbackDay { days_back: u32 },
    Success { days_back: u32 },
    Failed,
}

impl FetchState {
    pub const INITIAL: Self = Self::TryAttempt {
        days_back: 0,
        attempt: 0,
    };

    /// Transition out of `TryAttempt` after an attempt finished.
    pub fn after_attempt(
        days_back: u32,
        attempt: u32,
        succeeded: bool,
        policy: &FetchPolicy,
    ) -> Self {
        if succeeded {
            Self::Success { days_back }
        } else if attempt + 1 < policy.attempts_per_window() {
            Self::RetryAttempt {
                days_back,
                attempt: attempt + 1,
            }
        } else if days_back + 1 < policy.day_windows() {
            Self::FallbackDay {
                days_back: days_back + 1,
            }
        } else {
            Self::Failed
        }
    }
}
