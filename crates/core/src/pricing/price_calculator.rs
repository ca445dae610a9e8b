use rust_decimal::Decimal;

use super::PriceDifference;

/// Pure pricing formulas.
///
/// Every function returns `None` instead of failing when an input breaks the
/// positivity preconditions; no result is ever computed from a placeholder
/// zero.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Domestic price carried forward by the foreign leg's move since the
    /// target time: `domestic * (1 + (now - at_target) / at_target)`.
    ///
    /// `ratio` is accepted for call-site symmetry with
    /// [`implied_exchange_rate`](Self::implied_exchange_rate) and does not
    /// enter the formula.
    pub fn theoretical_price(
        domestic_price: Decimal,
        foreign_price_at_target: Option<Decimal>,
        foreign_price_now: Decimal,
        _ratio: Decimal,
    ) -> Option<Decimal> {
        let at_target = foreign_price_at_target.filter(|p| !p.is_zero())?;
        let change = (foreign_price_now - at_target).checked_div(at_target)?;
        domestic_price.checked_mul(Decimal::ONE + change)
    }

    /// `(domestic * ratio) / foreign`, defined only for strictly positive
    /// inputs.
    pub fn implied_exchange_rate(
        domestic_price: Decimal,
        foreign_price: Decimal,
        ratio: Decimal,
    ) -> Option<Decimal> {
        if domestic_price <= Decimal::ZERO
            || foreign_price <= Decimal::ZERO
            || ratio <= Decimal::ZERO
        {
            return None;
        }
        domestic_price
            .checked_mul(ratio)?
            .checked_div(foreign_price)
    }

    /// Gap between the theoretical and the observed domestic price.
    pub fn difference(
        theoretical_price: Decimal,
        domestic_price: Decimal,
    ) -> Option<PriceDifference> {
        if domestic_price <= Decimal::ZERO {
            return None;
        }
        let ratio = theoretical_price.checked_div(domestic_price)?;
        Some(PriceDifference {
            absolute: theoretical_price - domestic_price,
            percent: (ratio - Decimal::ONE) * Decimal::ONE_HUNDRED,
        })
    }
}
