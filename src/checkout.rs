//! Checkout Totals
//!
//! Order total derivation over the selected cart lines. The ordering is
//! fixed: promo discount before shipping before tax, with tax computed on the
//! post-discount, post-shipping amount.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};

use crate::lines::CartLine;

/// Promo codes recognised at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromoCode {
    /// `SAVE5`: 5% off the selected subtotal.
    Save5,
}

impl PromoCode {
    /// Parse user input into a promo code, case-insensitively.
    ///
    /// Whitespace is not stripped; padded input is rejected like any other
    /// unknown code.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        if input.eq_ignore_ascii_case("save5") {
            Some(Self::Save5)
        } else {
            None
        }
    }

    /// The fraction of the subtotal this code discounts.
    #[must_use]
    pub fn rate(self) -> Decimal {
        match self {
            Self::Save5 => Decimal::new(5, 2),
        }
    }

    /// The canonical display form of the code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Save5 => "SAVE5",
        }
    }
}

/// Order totals derived from a selection of cart lines.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    subtotal: Money<'static, Currency>,
    total_savings: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    promo_discount: Money<'static, Currency>,
    tax: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl OrderSummary {
    /// Derive order totals for the selected lines.
    ///
    /// Shipping is free above a 50-major-unit subtotal, otherwise 9.99. The
    /// promo discount and tax are rounded half-away-from-zero to the currency
    /// exponent before entering the total, so every figure is an exact money
    /// amount. The formula runs even for an empty selection (shipping and
    /// tax on it); blocking checkout is [`can_checkout`]'s job.
    #[must_use]
    pub fn compute(
        selected: &[&CartLine],
        promo: Option<PromoCode>,
        currency: &'static Currency,
    ) -> Self {
        let subtotal: Decimal = selected
            .iter()
            .map(|line| *line.effective_price().amount() * Decimal::from(line.quantity()))
            .sum();

        let total_savings: Decimal = selected
            .iter()
            .map(|line| {
                (*line.unit_price().amount() - *line.effective_price().amount())
                    * Decimal::from(line.quantity())
            })
            .sum();

        let shipping = if subtotal > Decimal::new(50, 0) {
            Decimal::ZERO
        } else {
            Decimal::new(999, 2)
        };

        let promo_discount = promo.map_or(Decimal::ZERO, |code| {
            round_to_exponent(subtotal * code.rate(), currency)
        });

        let tax = round_to_exponent(
            (subtotal - promo_discount + shipping) * Decimal::new(8, 2),
            currency,
        );

        let total = subtotal - promo_discount + shipping + tax;

        Self {
            subtotal: Money::from_decimal(subtotal, currency),
            total_savings: Money::from_decimal(total_savings, currency),
            shipping: Money::from_decimal(shipping, currency),
            promo_discount: Money::from_decimal(promo_discount, currency),
            tax: Money::from_decimal(tax, currency),
            total: Money::from_decimal(total, currency),
        }
    }

    /// Sum of `effective_price × quantity` over the selected lines.
    pub fn subtotal(&self) -> &Money<'static, Currency> {
        &self.subtotal
    }

    /// Sum of `(unit_price − effective_price) × quantity` over the selected lines.
    pub fn total_savings(&self) -> &Money<'static, Currency> {
        &self.total_savings
    }

    /// Shipping cost for this order.
    pub fn shipping(&self) -> &Money<'static, Currency> {
        &self.shipping
    }

    /// Amount discounted by the applied promo code.
    pub fn promo_discount(&self) -> &Money<'static, Currency> {
        &self.promo_discount
    }

    /// Tax on the post-discount, post-shipping amount.
    pub fn tax(&self) -> &Money<'static, Currency> {
        &self.tax
    }

    /// The amount to charge.
    pub fn total(&self) -> &Money<'static, Currency> {
        &self.total
    }
}

/// Whether checkout can proceed for the given selection.
///
/// Checkout is blocked when nothing is selected or any selected line is out
/// of stock.
#[must_use]
pub fn can_checkout(selected: &[&CartLine]) -> bool {
    !selected.is_empty() && selected.iter().all(|line| line.in_stock())
}

/// Round to the currency's exponent, midpoints away from zero.
fn round_to_exponent(amount: Decimal, currency: &'static Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
}
