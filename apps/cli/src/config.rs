use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use fairprice_core::constants::ALIGNMENT_TOLERANCE_MINUTES;
use fairprice_core::ResolverConfig;
use fairprice_market_data::{
    FetchPolicy, Interval, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DAY_FALLBACK,
};

/// Runtime settings, read from the environment (and `.env`).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub reference_table: PathBuf,
    pub output_dir: PathBuf,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub max_day_fallback: u32,
    /// `None` lets a provider call run without limit.
    pub attempt_timeout: Option<Duration>,
    pub target_time: NaiveTime,
    pub tolerance_minutes: i64,
    pub interval: Interval,
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_table: PathBuf::from("TickersRatios.csv"),
            output_dir: PathBuf::from("."),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            max_day_fallback: DEFAULT_MAX_DAY_FALLBACK,
            attempt_timeout: Some(DEFAULT_ATTEMPT_TIMEOUT),
            target_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            tolerance_minutes: ALIGNMENT_TOLERANCE_MINUTES,
            interval: Interval::default(),
            concurrency: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let reference_table = std::env::var("FAIRPRICE_REFERENCE_TABLE")
            .map(PathBuf::from)
            .unwrap_or(defaults.reference_table);
        let output_dir = std::env::var("FAIRPRICE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);
        let backoff_ms: u64 = env_or("FAIRPRICE_BACKOFF_MS", duration_ms(defaults.backoff))?;
        let timeout_ms: u64 = env_or(
            "FAIRPRICE_ATTEMPT_TIMEOUT_MS",
            defaults.attempt_timeout.map(duration_ms).unwrap_or(0),
        )?;
        let target_time = match std::env::var("FAIRPRICE_TARGET_TIME") {
            Ok(raw) => parse_target_time(&raw)
                .with_context(|| format!("Invalid FAIRPRICE_TARGET_TIME '{}'", raw))?,
            Err(_) => defaults.target_time,
        };
        let interval_minutes: u32 =
            env_or("FAIRPRICE_INTERVAL_MINUTES", defaults.interval.minutes())?;
        let interval = Interval::from_minutes(interval_minutes).with_context(|| {
            format!("Unsupported FAIRPRICE_INTERVAL_MINUTES {}", interval_minutes)
        })?;

        Ok(Self {
            reference_table,
            output_dir,
            max_attempts: env_or("FAIRPRICE_MAX_ATTEMPTS", defaults.max_attempts)?,
            backoff: Duration::from_millis(backoff_ms),
            max_day_fallback: env_or("FAIRPRICE_MAX_DAY_FALLBACK", defaults.max_day_fallback)?,
            attempt_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            target_time,
            tolerance_minutes: env_or("FAIRPRICE_TOLERANCE_MINUTES", defaults.tolerance_minutes)?,
            interval,
            concurrency: env_or("FAIRPRICE_CONCURRENCY", defaults.concurrency)?,
        })
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_max_day_fallback(self.max_day_fallback)
            .with_backoff(self.backoff)
            .with_attempt_timeout(self.attempt_timeout)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            target_time: self.target_time,
            tolerance: chrono::Duration::minutes(self.tolerance_minutes),
            interval: self.interval,
            concurrency: self.concurrency.max(1),
            ..ResolverConfig::default()
        }
    }
}

/// Reads `key`, keeping `default` when it is unset. A set but unparsable
/// value is an error.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} '{}'", key, raw)),
        None => Ok(default),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_target_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .with_context(|| format!("expected HH:MM, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_time() {
        assert_eq!(
            parse_target_time("17:00").unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap()
        );
        assert_eq!(
            parse_target_time(" 16:45:30 ").unwrap(),
            NaiveTime::from_hms_opt(16, 45, 30).unwrap()
        );
        assert!(parse_target_time("5pm").is_err());
    }

    #[test]
    fn test_defaults_map_onto_policy() {
        let config = Config::default();
        let policy = config.fetch_policy();
        assert_eq!(policy, FetchPolicy::default());
        // 15 calls of 10s plus 14 pauses of 1s
        assert_eq!(policy.worst_case_duration(), Some(Duration::from_secs(164)));

        let resolver = config.resolver_config();
        assert_eq!(resolver.tolerance, chrono::Duration::minutes(10));
        assert_eq!(resolver.domestic_suffix, ".BA");
    }

    #[test]
    fn test_numeric_values_reject_garbage() {
        let value: u32 = parse_or("FAIRPRICE_MAX_ATTEMPTS", None, 3).unwrap();
        assert_eq!(value, 3);

        let value: u32 =
            parse_or("FAIRPRICE_MAX_ATTEMPTS", Some(" 7 ".to_string()), 3).unwrap();
        assert_eq!(value, 7);

        let err = parse_or::<u32>("FAIRPRICE_MAX_ATTEMPTS", Some("abc".to_string()), 3)
            .unwrap_err();
        assert!(err.to_string().contains("FAIRPRICE_MAX_ATTEMPTS"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_zero_concurrency_is_sequential() {
        let config = Config {
            concurrency: 0,
            ..Config::default()
        };
        assert_eq!(config.resolver_config().concurrency, 1);
    }
}
