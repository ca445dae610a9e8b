use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ReferenceTableError;

/// A domestic listing and the foreign listing it tracks.
///
/// `ratio` is strictly positive; the table loader enforces it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPair {
    pub domestic_symbol: String,
    pub foreign_symbol: String,
    pub ratio: Decimal,
}

impl TickerPair {
    pub fn new(
        domestic_symbol: impl Into<String>,
        foreign_symbol: impl Into<String>,
        ratio: Decimal,
    ) -> Self {
        Self {
            domestic_symbol: domestic_symbol.into(),
            foreign_symbol: foreign_symbol.into(),
            ratio,
        }
    }
}

/// Row as it appears in the CSV file.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "ArgentineTicker")]
    domestic: String,
    #[serde(rename = "WallStreetTicker")]
    foreign: String,
    #[serde(rename = "Ratio")]
    ratio: String,
}

/// Outcome of matching user-entered tickers against the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickerSelection {
    /// Known pairs, in input order, without repeats.
    pub selected: Vec<TickerPair>,
    /// Entries with no row in the table, in input order.
    pub invalid: Vec<String>,
}

/// Pairs keyed by domestic ticker, in file order.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    pairs: Vec<TickerPair>,
    index: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn from_pairs(pairs: Vec<TickerPair>) -> Result<Self, ReferenceTableError> {
        let mut table = Self::default();
        for (i, pair) in pairs.into_iter().enumerate() {
            table.insert(i + 1, pair)?;
        }
        Ok(table)
    }

    /// Reads `ArgentineTicker,WallStreetTicker,Ratio` rows.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::default();
        for (i, record) in csv_reader.deserialize::<RawRow>().enumerate() {
            let row = i + 1;
            let raw = record?;
            if raw.domestic.is_empty() || raw.foreign.is_empty() {
                return Err(ReferenceTableError::EmptyTicker { row });
            }

            let ratio = Decimal::from_str(&raw.ratio)
                .ok()
                .filter(|r| *r > Decimal::ZERO)
                .ok_or_else(|| ReferenceTableError::InvalidRatio {
                    row,
                    symbol: raw.domestic.clone(),
                    value: raw.ratio.clone(),
                })?;

            table.insert(row, TickerPair::new(raw.domestic, raw.foreign, ratio))?;
        }

        debug!("Loaded {} ticker pairs", table.len());
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReferenceTableError> {
        let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
        Self::from_reader(file)
    }

    fn insert(&mut self, row: usize, pair: TickerPair) -> Result<(), ReferenceTableError> {
        if pair.ratio <= Decimal::ZERO {
            return Err(ReferenceTableError::InvalidRatio {
                row,
                symbol: pair.domestic_symbol.clone(),
                value: pair.ratio.to_string(),
            });
        }
        if self.index.contains_key(&pair.domestic_symbol) {
            return Err(ReferenceTableError::DuplicateTicker {
                row,
                symbol: pair.domestic_symbol,
            });
        }
        self.index
            .insert(pair.domestic_symbol.clone(), self.pairs.len());
        self.pairs.push(pair);
        Ok(())
    }

    pub fn get(&self, domestic_symbol: &str) -> Option<&TickerPair> {
        self.index.get(domestic_symbol).map(|&i| &self.pairs[i])
    }

    pub fn pairs(&self) -> &[TickerPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Matches a comma-separated ticker list, e.g. `"GGAL,YPFD,XXXX"`.
    pub fn select(&self, input: &str) -> TickerSelection {
        self.select_all(input.split(','))
    }

    pub fn select_all<'a>(&self, tickers: impl IntoIterator<Item = &'a str>) -> TickerSelection {
        let mut selection = TickerSelection::default();
        for ticker in tickers.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
            match self.get(ticker) {
                Some(pair) => {
                    if !selection.selected.contains(pair) {
                        selection.selected.push(pair.clone());
                    }
                }
                None => {
                    if !selection.invalid.iter().any(|t| t == ticker) {
                        selection.invalid.push(ticker.to_string());
                    }
                }
            }
        }
        selection
    }
}
