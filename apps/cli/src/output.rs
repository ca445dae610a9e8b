use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use fairprice_core::export::{format_amount, SummaryRow};
use fairprice_core::{DerivedMetrics, PairResolution, PriceInputs, Quote, Snapshot, TickerPair};
use serde::Serialize;

/// What gets shown for one pair: the resolved snapshot, plus prices and
/// metrics after manual entries were applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport<'a> {
    pub pair: &'a TickerPair,
    pub snapshot: Option<&'a Snapshot>,
    pub error: Option<String>,
    pub inputs: PriceInputs,
    pub metrics: DerivedMetrics,
    pub manual: bool,
}

impl<'a> PairReport<'a> {
    pub fn new(resolution: &'a PairResolution, manual: Option<&PriceInputs>) -> Self {
        let resolved = resolution
            .snapshot()
            .map(Snapshot::inputs)
            .unwrap_or_else(|| PriceInputs::new(resolution.pair.ratio));
        let inputs = match manual {
            Some(manual) => resolved.overridden_by(manual),
            None => resolved,
        };

        Self {
            pair: &resolution.pair,
            snapshot: resolution.snapshot(),
            error: resolution.outcome.as_ref().err().map(|e| e.to_string()),
            inputs,
            metrics: DerivedMetrics::compute(&inputs),
            manual: manual.is_some(),
        }
    }

    pub fn summary_row(&self) -> SummaryRow {
        SummaryRow::new(self.pair, &self.inputs, &self.metrics)
    }
}

pub fn build_reports<'a>(
    resolutions: &'a [PairResolution],
    manual: &HashMap<String, PriceInputs>,
) -> Vec<PairReport<'a>> {
    resolutions
        .iter()
        .map(|r| PairReport::new(r, manual.get(&r.pair.domestic_symbol)))
        .collect()
}

pub fn render_json(reports: &[PairReport<'_>]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

pub fn render_text(reports: &[PairReport<'_>], today: NaiveDate, target_label: &str) -> String {
    let mut out = String::new();
    for report in reports {
        render_pair(&mut out, report, today, target_label);
        out.push('\n');
    }
    out
}

fn render_pair(out: &mut String, report: &PairReport<'_>, today: NaiveDate, target_label: &str) {
    let pair = report.pair;
    out.push_str(&format!(
        "{} / {}  ratio {}{}\n",
        pair.domestic_symbol,
        pair.foreign_symbol,
        format_amount(Some(pair.ratio)),
        if report.manual { "  [manual]" } else { "" }
    ));

    if let Some(error) = &report.error {
        out.push_str(&format!("  error: {}\n", error));
    }

    let snapshot = report.snapshot;
    for leg_error in snapshot.map(Snapshot::leg_errors).unwrap_or_default() {
        out.push_str(&format!("  warning: {}\n", leg_error));
    }
    let quote_line = |label: &str, price, quote: Option<&Quote>| {
        let stamp = quote
            .map(|q| format!("  {} {}", q.time_label(), q.delay_state))
            .unwrap_or_default();
        format!("  {:<22}{:>12}{}\n", label, format_amount(price), stamp)
    };

    out.push_str(&quote_line(
        "Domestic close",
        report.inputs.domestic_price,
        snapshot.and_then(Snapshot::domestic_quote),
    ));
    out.push_str(&quote_line(
        &format!("Foreign at {}", target_label),
        report.inputs.foreign_price_at_target,
        snapshot.and_then(Snapshot::foreign_quote_at_target),
    ));
    let foreign_now = snapshot.and_then(Snapshot::foreign_quote_now);
    out.push_str(&quote_line(
        "Foreign now",
        report.inputs.foreign_price_now,
        foreign_now,
    ));

    let metrics = &report.metrics;
    let difference = metrics
        .difference
        .map(|d| {
            format!(
                "  ({}, {}{}%)",
                format_amount(Some(d.absolute)),
                if d.percent.is_sign_negative() { "" } else { "+" },
                format_amount(Some(d.percent))
            )
        })
        .unwrap_or_default();
    out.push_str(&format!(
        "  {:<22}{:>12}{}\n",
        "Theoretical price",
        format_amount(metrics.theoretical_price),
        difference
    ));

    let fallback = if metrics.uses_rate_fallback() {
        "  (current rate)"
    } else {
        ""
    };
    out.push_str(&format!(
        "  {:<22}{:>12}{}\n",
        format!("Implied rate {}", target_label),
        format_amount(metrics.implied_rate_at_target_or_now()),
        fallback
    ));
    let now_label = foreign_now
        .map(Quote::time_label)
        .unwrap_or_else(|| "now".to_string());
    out.push_str(&format!(
        "  {:<22}{:>12}\n",
        format!("Implied rate {}", now_label),
        format_amount(metrics.implied_rate_now)
    ));

    if let Some(snapshot) = snapshot {
        let legs = [
            (pair.domestic_symbol.as_str(), snapshot.domestic_days_back()),
            (pair.foreign_symbol.as_str(), snapshot.foreign_days_back()),
        ];
        for (symbol, days_back) in legs {
            match days_back {
                Some(days) if days > 0 => {
                    let date = today
                        .checked_sub_days(Days::new(u64::from(days)))
                        .unwrap_or(today);
                    out.push_str(&format!(
                        "  note: using data from {} for {}\n",
                        date.format("%Y-%m-%d"),
                        symbol
                    ));
                }
                Some(_) => {}
                None => out.push_str(&format!("  note: no data for {}\n", symbol)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fairprice_core::constants::DOMESTIC_TIMEZONE;
    use fairprice_core::snapshot::SnapshotParts;
    use fairprice_core::DelayState;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn quote(h: u32, m: u32, price: Decimal, delay_state: DelayState) -> Quote {
        Quote {
            price,
            timestamp: DOMESTIC_TIMEZONE.with_ymd_and_hms(2024, 3, 8, h, m, 0).unwrap(),
            delay_state,
        }
    }

    fn resolution(foreign_at_target: Option<Quote>) -> PairResolution {
        let pair = TickerPair::new("GGAL", "GGAL", dec!(2));
        let snapshot = Snapshot::new(SnapshotParts {
            ratio: pair.ratio,
            domestic_quote: Some(quote(16, 55, dec!(1000), DelayState::Delayed)),
            domestic_days_back: Some(1),
            foreign_quote_at_target: foreign_at_target,
            foreign_quote_now: Some(quote(18, 25, dec!(52), DelayState::RealTime)),
            foreign_days_back: Some(0),
            foreign_delay_state: DelayState::RealTime,
            leg_errors: Vec::new(),
        });
        PairResolution {
            pair,
            outcome: Ok(snapshot),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    #[test]
    fn test_text_shows_quotes_and_metrics() {
        let resolutions = vec![resolution(Some(quote(17, 1, dec!(50), DelayState::RealTime)))];
        let reports = build_reports(&resolutions, &HashMap::new());
        let text = render_text(&reports, today(), "17:00");

        assert!(text.contains("GGAL / GGAL  ratio 2.00"));
        assert!(text.contains("17:01:00 REAL-TIME"));
        assert!(text.contains("1040.00  (40.00, +4.00%)"));
        assert!(text.contains("Implied rate 18:25:00"));
        assert!(text.contains("note: using data from 2024-03-07 for GGAL"));
    }

    #[test]
    fn test_text_lists_failed_leg() {
        let pair = TickerPair::new("GGAL", "GGAL", dec!(2));
        let snapshot = Snapshot::new(SnapshotParts {
            ratio: pair.ratio,
            domestic_quote: None,
            domestic_days_back: None,
            foreign_quote_at_target: Some(quote(17, 1, dec!(50), DelayState::RealTime)),
            foreign_quote_now: Some(quote(18, 25, dec!(52), DelayState::RealTime)),
            foreign_days_back: Some(0),
            foreign_delay_state: DelayState::RealTime,
            leg_errors: vec!["Provider failed for GGAL.BA after 15 attempts: 502".to_string()],
        });
        let resolutions = vec![PairResolution {
            pair,
            outcome: Ok(snapshot),
        }];
        let reports = build_reports(&resolutions, &HashMap::new());
        let text = render_text(&reports, today(), "17:00");

        assert!(text.contains("warning: Provider failed for GGAL.BA"));
        assert!(text.contains("17:01:00 REAL-TIME"));
        assert!(reports[0].error.is_none());
    }

    #[test]
    fn test_manual_price_fills_missing_target() {
        let resolutions = vec![resolution(None)];
        let reports = build_reports(&resolutions, &HashMap::new());
        assert_eq!(reports[0].metrics.theoretical_price, None);
        assert!(render_text(&reports, today(), "17:00").contains("(current rate)"));

        let mut manual = HashMap::new();
        manual.insert(
            "GGAL".to_string(),
            PriceInputs::new(dec!(2)).with_foreign_price_at_target(dec!(50)),
        );
        let reports = build_reports(&resolutions, &manual);
        assert!(reports[0].manual);
        assert_eq!(reports[0].metrics.theoretical_price, Some(dec!(1040)));
        assert_eq!(reports[0].summary_row().theoretical_price, "1040.00");
    }
}
