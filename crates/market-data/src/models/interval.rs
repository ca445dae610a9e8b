use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Bar resolution requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
}

impl Interval {
    pub const fn minutes(self) -> u32 {
        match self {
            Self::OneMinute => 1,
            Self::TwoMinutes => 2,
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
        }
    }

    /// Maps a minute count to a supported interval.
    pub const fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            1 => Some(Self::OneMinute),
            2 => Some(Self::TwoMinutes),
            5 => Some(Self::FiveMinutes),
            15 => Some(Self::FifteenMinutes),
            30 => Some(Self::ThirtyMinutes),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::TwoMinutes => "2m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_round_trip_for_supported_values() {
        for minutes in [1, 2, 5, 15, 30] {
            let interval = Interval::from_minutes(minutes).expect("supported");
            assert_eq!(interval.minutes(), minutes);
        }
        assert_eq!(Interval::from_minutes(7), None);
    }

    #[test]
    fn test_default_is_one_minute() {
        assert_eq!(Interval::default(), Interval::OneMinute);
        assert_eq!(Interval::default().to_string(), "1m");
    }
}
