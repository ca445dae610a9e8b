use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use fairprice_market_data::{PriceSample, PriceSeries};

use crate::constants::{ALIGNMENT_TOLERANCE_MINUTES, DOMESTIC_TIMEZONE};
use crate::delay::DelayState;
use crate::snapshot::Quote;

/// Turns raw samples into display quotes in the domestic timezone.
///
/// Two lookups are offered: the latest sample of a series, and the sample
/// closest to a target time of day within `±tolerance` on a given date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSeriesAligner {
    timezone: Tz,
    tolerance: Duration,
}

impl Default for TimeSeriesAligner {
    fn default() -> Self {
        Self::new(
            DOMESTIC_TIMEZONE,
            Duration::minutes(ALIGNMENT_TOLERANCE_MINUTES),
        )
    }
}

impl TimeSeriesAligner {
    pub fn new(timezone: Tz, tolerance: Duration) -> Self {
        Self {
            timezone,
            tolerance: tolerance.abs(),
        }
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Last sample of the series. The delay state is the caller's, it is not
    /// derived from the data.
    pub fn latest(&self, series: &PriceSeries, delay_state: DelayState) -> Option<Quote> {
        series
            .last()
            .map(|sample| self.to_quote(sample, delay_state))
    }

    /// Sample closest to `target` on `today`, both in the domestic timezone.
    ///
    /// Only samples whose local date is `today` are candidates; their dates are
    /// never rewritten. Returns `None` when no candidate lies within the window,
    /// which callers must read as "no target-time price".
    pub fn nearest_at(
        &self,
        series: &PriceSeries,
        target: NaiveTime,
        today: NaiveDate,
        delay_state: DelayState,
    ) -> Option<Quote> {
        self.nearest_sample(series.samples(), target, today)
            .map(|sample| self.to_quote(sample, delay_state))
    }

    /// Slice-level lookup behind [`nearest_at`](Self::nearest_at).
    ///
    /// Exact ties keep the earlier sample in slice order.
    pub fn nearest_sample<'a>(
        &self,
        samples: &'a [PriceSample],
        target: NaiveTime,
        today: NaiveDate,
    ) -> Option<&'a PriceSample> {
        let target = self.local_instant(today, target)?;

        let mut best: Option<(&PriceSample, Duration)> = None;
        for sample in samples {
            let local = sample.timestamp.with_timezone(&self.timezone);
            if local.date_naive() != today {
                continue;
            }

            let distance = (local - target).abs();
            if distance > self.tolerance {
                continue;
            }

            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((sample, distance)),
            }
        }

        best.map(|(sample, _)| sample)
    }

    fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
        self.timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
    }

    fn to_quote(&self, sample: &PriceSample, delay_state: DelayState) -> Quote {
        Quote {
            price: sample.price,
            timestamp: sample.timestamp.with_timezone(&self.timezone),
            delay_state,
        }
    }
}
