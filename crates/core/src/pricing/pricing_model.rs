use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PriceCalculator;

/// Theoretical minus domestic price, absolute and in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDifference {
    pub absolute: Decimal,
    pub percent: Decimal,
}

/// Plain numbers the formulas run on.
///
/// Values may come from resolved quotes or be typed in by a user; the
/// calculation does not care which. Non-positive values count as missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInputs {
    pub domestic_price: Option<Decimal>,
    pub foreign_price_at_target: Option<Decimal>,
    pub foreign_price_now: Option<Decimal>,
    pub ratio: Decimal,
}

impl PriceInputs {
    pub fn new(ratio: Decimal) -> Self {
        Self {
            domestic_price: None,
            foreign_price_at_target: None,
            foreign_price_now: None,
            ratio,
        }
    }

    pub fn with_domestic_price(mut self, price: Decimal) -> Self {
        self.domestic_price = Some(price);
        self
    }

    pub fn with_foreign_price_at_target(mut self, price: Decimal) -> Self {
        self.foreign_price_at_target = Some(price);
        self
    }

    pub fn with_foreign_price_now(mut self, price: Decimal) -> Self {
        self.foreign_price_now = Some(price);
        self
    }

    /// Replaces prices with every value `overrides` sets; unset ones keep
    /// the resolved price.
    pub fn overridden_by(self, overrides: &PriceInputs) -> Self {
        Self {
            domestic_price: overrides.domestic_price.or(self.domestic_price),
            foreign_price_at_target: overrides
                .foreign_price_at_target
                .or(self.foreign_price_at_target),
            foreign_price_now: overrides.foreign_price_now.or(self.foreign_price_now),
            ratio: self.ratio,
        }
    }

    pub fn is_complete(&self) -> bool {
        positive(self.domestic_price).is_some()
            && positive(self.foreign_price_at_target).is_some()
            && positive(self.foreign_price_now).is_some()
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Metrics derived from one set of [`PriceInputs`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub theoretical_price: Option<Decimal>,
    pub difference: Option<PriceDifference>,
    pub implied_rate_at_target: Option<Decimal>,
    pub implied_rate_now: Option<Decimal>,
}

impl DerivedMetrics {
    pub fn compute(inputs: &PriceInputs) -> Self {
        let domestic = positive(inputs.domestic_price);
        let at_target = positive(inputs.foreign_price_at_target);
        let now = positive(inputs.foreign_price_now);

        let theoretical_price = domestic.zip(now).and_then(|(d, n)| {
            PriceCalculator::theoretical_price(d, at_target, n, inputs.ratio)
        });
        let difference = theoretical_price
            .zip(domestic)
            .and_then(|(t, d)| PriceCalculator::difference(t, d));

        let implied = |foreign: Option<Decimal>| {
            domestic
                .zip(foreign)
                .and_then(|(d, f)| PriceCalculator::implied_exchange_rate(d, f, inputs.ratio))
        };

        Self {
            theoretical_price,
            difference,
            implied_rate_at_target: implied(at_target),
            implied_rate_now: implied(now),
        }
    }

    /// Implied rate at the target time, or the current one when the target
    /// rate is missing. Display only: `implied_rate_at_target` keeps its
    /// `None`.
    pub fn implied_rate_at_target_or_now(&self) -> Option<Decimal> {
        self.implied_rate_at_target.or(self.implied_rate_now)
    }

    /// True when the target-time figure shown is really the current rate.
    pub fn uses_rate_fallback(&self) -> bool {
        self.implied_rate_at_target.is_none() && self.implied_rate_now.is_some()
    }
}
