//! Fair-price and implied exchange rate formulas.

mod price_calculator;
mod pricing_model;

pub use price_calculator::PriceCalculator;
pub use pricing_model::{DerivedMetrics, PriceDifference, PriceInputs};
