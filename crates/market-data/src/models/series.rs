use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::PriceSample;

/// Calendar-date window requested from a provider, `[start, end)`.
///
/// Dates are interpreted in the timezone passed to [`FetchWindow::bounds_utc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window covering a single calendar day: `[day, day + 1)`.
    pub fn single_day(day: NaiveDate) -> Self {
        let end = day.checked_add_days(Days::new(1)).unwrap_or(day);
        Self { start: day, end }
    }

    /// Shifts both ends back by the same number of days, keeping the length.
    pub fn shifted_back(&self, days: u32) -> Self {
        let days = Days::new(u64::from(days));
        Self {
            start: self.start.checked_sub_days(days).unwrap_or(NaiveDate::MIN),
            end: self.end.checked_sub_days(days).unwrap_or(NaiveDate::MIN),
        }
    }

    /// Midnight-to-midnight instants of the window in `tz`, as UTC.
    pub fn bounds_utc(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (local_midnight_utc(self.start, tz), local_midnight_utc(self.end, tz))
    }
}

fn local_midnight_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Ordered close prices for one symbol over a fetch window.
///
/// Samples are kept in non-decreasing timestamp order. Duplicates and gaps
/// are allowed; minute bars are frequently missing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub window: FetchWindow,
    /// How many days the window was shifted back before data was found.
    /// Anything above zero means a stale date was used.
    pub days_back: u32,
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        window: FetchWindow,
        mut samples: Vec<PriceSample>,
    ) -> Self {
        // stable: equal timestamps keep acquisition order
        samples.sort_by_key(|s| s.timestamp);
        Self {
            symbol: symbol.into(),
            window,
            days_back: 0,
            samples,
        }
    }

    pub fn with_days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample, if any.
    pub fn last(&self) -> Option<&PriceSample> {
        self.samples.last()
    }

    pub fn is_stale(&self) -> bool {
        self.days_back > 0
    }

    /// Drops every sample more recent than `cutoff`.
    pub fn retain_not_after(&mut self, cutoff: DateTime<Utc>) {
        self.samples.retain(|s| s.timestamp <= cutoff);
    }
}
