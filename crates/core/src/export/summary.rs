use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::{DISPLAY_DECIMAL_PRECISION, NOT_AVAILABLE};
use crate::errors::Result;
use crate::pricing::{DerivedMetrics, PriceDifference, PriceInputs};
use crate::reference::TickerPair;

/// One exported line. Every numeric column is pre-formatted text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Domestic Ticker")]
    pub domestic_ticker: String,
    #[serde(rename = "Foreign Ticker")]
    pub foreign_ticker: String,
    #[serde(rename = "Ratio")]
    pub ratio: String,
    #[serde(rename = "Domestic Close")]
    pub domestic_close: String,
    #[serde(rename = "Foreign Price at Target")]
    pub foreign_price_at_target: String,
    #[serde(rename = "Foreign Price Now")]
    pub foreign_price_now: String,
    #[serde(rename = "Theoretical Price")]
    pub theoretical_price: String,
    #[serde(rename = "Difference")]
    pub difference: String,
    #[serde(rename = "Implied Rate at Target")]
    pub implied_rate_at_target: String,
    #[serde(rename = "Implied Rate Now")]
    pub implied_rate_now: String,
}

impl SummaryRow {
    /// The target-rate column shows the current rate when the target one is
    /// missing, matching what is displayed interactively.
    pub fn new(pair: &TickerPair, inputs: &PriceInputs, metrics: &DerivedMetrics) -> Self {
        Self {
            domestic_ticker: pair.domestic_symbol.clone(),
            foreign_ticker: pair.foreign_symbol.clone(),
            ratio: format_amount(Some(pair.ratio)),
            domestic_close: format_amount(inputs.domestic_price),
            foreign_price_at_target: format_amount(inputs.foreign_price_at_target),
            foreign_price_now: format_amount(inputs.foreign_price_now),
            theoretical_price: format_amount(metrics.theoretical_price),
            difference: format_difference(metrics.difference.as_ref()),
            implied_rate_at_target: format_amount(metrics.implied_rate_at_target_or_now()),
            implied_rate_now: format_amount(metrics.implied_rate_now),
        }
    }
}

/// Two decimals, or `N/A`.
pub fn format_amount(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2}", v.round_dp(DISPLAY_DECIMAL_PRECISION)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `40.00 (+4.00%)`
fn format_difference(difference: Option<&PriceDifference>) -> String {
    match difference {
        Some(d) => {
            let sign = if d.percent.is_sign_negative() { "" } else { "+" };
            format!(
                "{} ({}{}%)",
                format_amount(Some(d.absolute)),
                sign,
                format_amount(Some(d.percent))
            )
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `summary_YYYYMMDD.csv`
pub fn summary_file_name(date: NaiveDate) -> String {
    format!("summary_{}.csv", date.format("%Y%m%d"))
}

pub fn write_summary<W: Write>(writer: W, rows: &[SummaryRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the summary into `dir` and returns the file path.
pub fn write_summary_file(dir: &Path, date: NaiveDate, rows: &[SummaryRow]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(summary_file_name(date));
    let file = std::fs::File::create(&path)?;
    write_summary(file, rows)?;
    info!("Wrote {} summary row(s) to {}", rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scenario() -> (TickerPair, PriceInputs) {
        let pair = TickerPair::new("GGAL", "GGAL", dec!(2));
        let inputs = PriceInputs::new(pair.ratio)
            .with_domestic_price(dec!(1000))
            .with_foreign_price_at_target(dec!(50))
            .with_foreign_price_now(dec!(52));
        (pair, inputs)
    }

    #[test]
    fn test_row_formats_two_decimals() {
        let (pair, inputs) = scenario();
        let row = SummaryRow::new(&pair, &inputs, &DerivedMetrics::compute(&inputs));

        assert_eq!(row.ratio, "2.00");
        assert_eq!(row.domestic_close, "1000.00");
        assert_eq!(row.theoretical_price, "1040.00");
        assert_eq!(row.difference, "40.00 (+4.00%)");
        assert_eq!(row.implied_rate_at_target, "40.00");
        assert_eq!(row.implied_rate_now, "38.46");
    }

    #[test]
    fn test_missing_values_are_not_available() {
        let pair = TickerPair::new("YPFD", "YPF", dec!(1));
        let inputs = PriceInputs::new(pair.ratio).with_domestic_price(dec!(30000));
        let row = SummaryRow::new(&pair, &inputs, &DerivedMetrics::compute(&inputs));

        assert_eq!(row.foreign_price_now, "N/A");
        assert_eq!(row.theoretical_price, "N/A");
        assert_eq!(row.difference, "N/A");
        assert_eq!(row.implied_rate_at_target, "N/A");
    }

    #[test]
    fn test_negative_difference_has_no_plus_sign() {
        let pair = TickerPair::new("GGAL", "GGAL", dec!(2));
        let inputs = PriceInputs::new(pair.ratio)
            .with_domestic_price(dec!(1000))
            .with_foreign_price_at_target(dec!(50))
            .with_foreign_price_now(dec!(49));
        let row = SummaryRow::new(&pair, &inputs, &DerivedMetrics::compute(&inputs));
        assert_eq!(row.difference, "-20.00 (-2.00%)");
    }

    #[test]
    fn test_csv_has_fixed_header() {
        let (pair, inputs) = scenario();
        let rows = vec![SummaryRow::new(&pair, &inputs, &DerivedMetrics::compute(&inputs))];
        let mut buffer = Vec::new();
        write_summary(&mut buffer, &rows).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Domestic Ticker,Foreign Ticker,Ratio,Domestic Close,Foreign Price at Target,\
                 Foreign Price Now,Theoretical Price,Difference,Implied Rate at Target,Implied Rate Now"
            )
        );
        assert_eq!(
            lines.next(),
            Some("GGAL,GGAL,2.00,1000.00,50.00,52.00,1040.00,40.00 (+4.00%),40.00,38.46")
        );
    }

    #[test]
    fn test_file_name_uses_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(summary_file_name(date), "summary_20240308.csv");
    }
}
