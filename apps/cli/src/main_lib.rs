use std::sync::Arc;

use anyhow::{Context, Result};
use fairprice_core::SnapshotResolver;
use fairprice_market_data::{DataFetcher, YahooProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("FAIRPRICE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

pub fn build_resolver(config: &Config) -> Result<SnapshotResolver> {
    let provider = YahooProvider::new().context("Failed to initialise Yahoo provider")?;
    let policy = config.fetch_policy();
    if let Some(bound) = policy.worst_case_duration() {
        tracing::debug!("Worst-case fetch time per symbol: {:?}", bound);
    }
    let fetcher = DataFetcher::new(Arc::new(provider), policy);
    Ok(SnapshotResolver::new(
        Arc::new(fetcher),
        config.resolver_config(),
    ))
}
