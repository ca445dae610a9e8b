use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DOMESTIC_TIMEZONE, SESSION_END_HOUR, SESSION_END_MINUTE, SESSION_START_HOUR,
    SESSION_START_MINUTE,
};

/// Whether a feed is shown with the regulatory delay applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum DelayState {
    RealTime,
    Delayed,
}

impl DelayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayState::RealTime => "REAL-TIME",
            DelayState::Delayed => "DELAYED",
        }
    }

    pub fn is_delayed(&self) -> bool {
        matches!(self, DelayState::Delayed)
    }
}

impl From<bool> for DelayState {
    fn from(delayed: bool) -> Self {
        if delayed {
            DelayState::Delayed
        } else {
            DelayState::RealTime
        }
    }
}

impl fmt::Display for DelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether the foreign feed must be delayed at a given instant.
///
/// The session is the half-open interval `[session_start, session_end)` in the
/// domestic timezone on the day of `now`. The domestic feed is always delayed
/// and does not consult this policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayPolicy {
    timezone: Tz,
    session_start: NaiveTime,
    session_end: NaiveTime,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            timezone: DOMESTIC_TIMEZONE,
            session_start: NaiveTime::from_hms_opt(SESSION_START_HOUR, SESSION_START_MINUTE, 0)
                .unwrap_or_default(),
            session_end: NaiveTime::from_hms_opt(SESSION_END_HOUR, SESSION_END_MINUTE, 0)
                .unwrap_or_default(),
        }
    }
}

impl DelayPolicy {
    pub fn new(timezone: Tz, session_start: NaiveTime, session_end: NaiveTime) -> Self {
        Self {
            timezone,
            session_start,
            session_end,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn session(&self) -> (NaiveTime, NaiveTime) {
        (self.session_start, self.session_end)
    }

    pub fn should_delay(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone).time();
        // sub-second precision is ignored
        let local = local.with_nanosecond(0).unwrap_or(local);
        self.session_start <= local && local < self.session_end
    }

    pub fn delay_state(&self, now: DateTime<Utc>) -> DelayState {
        DelayState::from(self.should_delay(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        DOMESTIC_TIMEZONE
            .with_ymd_and_hms(2024, 3, 8, hour, minute, second)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_inside_session_is_delayed() {
        let policy = DelayPolicy::default();
        assert!(policy.should_delay(at(12, 0, 0)));
        assert!(policy.should_delay(at(11, 30, 0)));
        assert!(policy.should_delay(at(16, 59, 59)));
        assert_eq!(policy.delay_state(at(12, 0, 0)), DelayState::Delayed);
    }

    #[test]
    fn test_outside_session_is_real_time() {
        let policy = DelayPolicy::default();
        assert!(!policy.should_delay(at(10, 0, 0)));
        assert!(!policy.should_delay(at(18, 0, 0)));
        assert!(!policy.should_delay(at(11, 29, 59)));
        assert_eq!(policy.delay_state(at(18, 0, 0)), DelayState::RealTime);
    }

    #[test]
    fn test_session_end_is_exclusive() {
        let policy = DelayPolicy::default();
        assert!(!policy.should_delay(at(17, 0, 0)));

        // 16:59:59.999 truncates to 16:59:59
        let almost = at(16, 59, 59) + chrono::Duration::milliseconds(999);
        assert!(policy.should_delay(almost));
    }

    #[test]
    fn test_uses_domestic_clock_not_utc() {
        let policy = DelayPolicy::default();
        // 15:00 UTC is 12:00 in Buenos Aires
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 15, 0, 0).unwrap();
        assert!(policy.should_delay(now));
    }

    #[test]
    fn test_labels() {
        assert_eq!(DelayState::Delayed.to_string(), "DELAYED");
        assert_eq!(DelayState::RealTime.to_string(), "REAL-TIME");
        assert_eq!(
            serde_json::to_string(&DelayState::RealTime).unwrap(),
            "\"REAL-TIME\""
        );
    }
}
