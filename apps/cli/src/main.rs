//! Fairprice CLI: resolve fair-price snapshots for a set of cross-listed tickers.
//!
//! Tickers are matched against the reference table (`ArgentineTicker`,
//! `WallStreetTicker`, `Ratio`). Each pair is resolved once, printed, and
//! written to `summary_<YYYYMMDD>.csv` unless `--no-export` is given.

mod config;
mod main_lib;
mod manual;
mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use fairprice_core::export::write_summary_file;
use fairprice_core::{ReferenceTable, ResolutionRequest, TickerSelection};

use config::{parse_target_time, Config};
use main_lib::{build_resolver, init_tracing};
use manual::ManualPrice;

#[derive(Parser)]
#[command(
    name = "fairprice",
    about = "Theoretical price and implied exchange rate for cross-listed tickers"
)]
struct Cli {
    /// Comma-separated domestic tickers (e.g. GGAL,YPFD). Defaults to every
    /// ticker in the reference table.
    tickers: Option<String>,

    /// Reference table CSV. Overrides FAIRPRICE_REFERENCE_TABLE.
    #[arg(long)]
    table: Option<PathBuf>,

    /// Directory for the summary CSV. Overrides FAIRPRICE_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip writing the summary CSV.
    #[arg(long, default_value_t = false)]
    no_export: bool,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Target time of day, HH:MM. Overrides FAIRPRICE_TARGET_TIME.
    #[arg(long, value_parser = parse_target_time)]
    target_time: Option<chrono::NaiveTime>,

    /// Pairs resolved at once. Overrides FAIRPRICE_CONCURRENCY.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Manual price, TICKER:FIELD=VALUE with FIELD one of domestic, target,
    /// now. Repeatable.
    #[arg(long = "set", value_name = "TICKER:FIELD=VALUE")]
    manual: Vec<ManualPrice>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(table) = &self.table {
            config.reference_table = table.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(target_time) = self.target_time {
            config.target_time = target_time;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    init_tracing();
    cli.apply(&mut config);

    let table = ReferenceTable::from_path(&config.reference_table).with_context(|| {
        format!(
            "Failed to load reference table {}",
            config.reference_table.display()
        )
    })?;

    let selection = match &cli.tickers {
        Some(tickers) => table.select(tickers),
        None => TickerSelection {
            selected: table.pairs().to_vec(),
            invalid: Vec::new(),
        },
    };
    if !selection.invalid.is_empty() {
        tracing::warn!("Unknown tickers: {}", selection.invalid.join(", "));
    }
    if selection.selected.is_empty() {
        bail!("No valid tickers selected");
    }

    let manual = manual::collect(&cli.manual, &selection.selected);
    let resolver = build_resolver(&config)?;

    let now = Utc::now();
    let today = now.with_timezone(&resolver.config().timezone).date_naive();
    let resolutions = resolver
        .resolve(ResolutionRequest::new(selection.selected, now))
        .await;

    let reports = output::build_reports(&resolutions, &manual);
    if cli.json {
        println!("{}", output::render_json(&reports)?);
    } else {
        let target_label = config.target_time.format("%H:%M").to_string();
        print!("{}", output::render_text(&reports, today, &target_label));
    }

    if !cli.no_export {
        let rows: Vec<_> = reports
            .iter()
            .filter(|r| r.snapshot.is_some())
            .map(|r| r.summary_row())
            .collect();
        if rows.is_empty() {
            tracing::warn!("Nothing resolved, summary not written");
        } else {
            let path = write_summary_file(&config.output_dir, today, &rows)?;
            tracing::info!("Summary saved to {}", path.display());
        }
    }

    let failed = resolutions.iter().filter(|r| r.outcome.is_err()).count();
    if failed > 0 {
        tracing::warn!("{} of {} pair(s) failed", failed, resolutions.len());
    }

    Ok(())
}
