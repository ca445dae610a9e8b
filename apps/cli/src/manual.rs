//! Manually entered prices, `--set TICKER:FIELD=VALUE`.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use fairprice_core::{PriceInputs, TickerPair};
use rust_decimal::Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManualField {
    Domestic,
    Target,
    Now,
}

/// One `--set` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManualPrice {
    pub ticker: String,
    pub field: ManualField,
    pub price: Decimal,
}

impl FromStr for ManualPrice {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let (ticker, rest) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("expected TICKER:FIELD=VALUE, got '{}'", raw))?;
        let (field, value) = rest
            .split_once('=')
            .ok_or_else(|| anyhow!("expected TICKER:FIELD=VALUE, got '{}'", raw))?;

        let field = match field.trim().to_ascii_lowercase().as_str() {
            "domestic" => ManualField::Domestic,
            "target" => ManualField::Target,
            "now" => ManualField::Now,
            other => bail!("unknown field '{}' (use domestic, target or now)", other),
        };
        let price = Decimal::from_str(value.trim())
            .map_err(|e| anyhow!("invalid price '{}': {}", value, e))?;
        if price <= Decimal::ZERO {
            bail!("price must be positive, got {}", price);
        }

        Ok(Self {
            ticker: ticker.trim().to_string(),
            field,
            price,
        })
    }
}

/// Groups entries per domestic ticker, using each pair's ratio.
pub fn collect(entries: &[ManualPrice], pairs: &[TickerPair]) -> HashMap<String, PriceInputs> {
    let mut manual = HashMap::new();
    for pair in pairs {
        let mut inputs = PriceInputs::new(pair.ratio);
        let mut any = false;
        for entry in entries.iter().filter(|e| e.ticker == pair.domestic_symbol) {
            inputs = match entry.field {
                ManualField::Domestic => inputs.with_domestic_price(entry.price),
                ManualField::Target => inputs.with_foreign_price_at_target(entry.price),
                ManualField::Now => inputs.with_foreign_price_now(entry.price),
            };
            any = true;
        }
        if any {
            manual.insert(pair.domestic_symbol.clone(), inputs);
        }
    }
    manual
}
