//! Cart Lines

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors related to cart line construction.
#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    /// The discounted price exceeds the full unit price (both in minor units).
    #[error("Discounted price {0} exceeds unit price {1}")]
    DiscountedAbovePrice(i64, i64),

    /// The discounted price's currency differs from the unit price's currency.
    #[error("Discounted price has currency {0}, but unit price has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// Identifier for a cart line, stable for the lifetime of the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(u64);

impl LineId {
    /// Create a line id from its raw value.
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Line data supplied by a catalog consumer.
///
/// Ids and selection state are assigned by the store when the draft is added.
#[derive(Clone, Debug, PartialEq)]
pub struct LineDraft {
    /// Product name.
    pub name: String,

    /// Product brand.
    pub brand: String,

    /// Chosen colour variant.
    pub color: String,

    /// Display image path.
    pub image: String,

    /// Pre-discount unit price.
    pub unit_price: Money<'static, Currency>,

    /// Effective unit price after discount, if the product is discounted.
    pub discounted_unit_price: Option<Money<'static, Currency>>,

    /// Informational discount percentage; totals always use the prices.
    pub discount_percent: Decimal,

    /// Requested quantity (clamped into `[1, max_quantity]` on construction).
    pub quantity: u32,

    /// Stock ceiling for the quantity; 0 means unavailable.
    pub max_quantity: u32,

    /// Availability flag.
    pub in_stock: bool,
}

/// One row in the cart: a [`LineDraft`] plus identity and selection state.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    id: LineId,
    name: String,
    brand: String,
    color: String,
    image: String,
    unit_price: Money<'static, Currency>,
    discounted_unit_price: Option<Money<'static, Currency>>,
    discount_percent: Decimal,
    quantity: u32,
    max_quantity: u32,
    in_stock: bool,
    selected: bool,
}

impl CartLine {
    /// Create a cart line from a draft.
    ///
    /// The draft quantity is clamped into `[1, max_quantity]`.
    ///
    /// # Errors
    ///
    /// Returns a [`LineError`] if the discounted price exceeds the unit price
    /// or the two prices do not share a currency.
    pub fn from_draft(id: LineId, draft: LineDraft, selected: bool) -> Result<Self, LineError> {
        if let Some(discounted) = &draft.discounted_unit_price {
            if discounted.currency() != draft.unit_price.currency() {
                return Err(LineError::CurrencyMismatch(
                    discounted.currency().iso_alpha_code,
                    draft.unit_price.currency().iso_alpha_code,
                ));
            }

            if discounted.to_minor_units() > draft.unit_price.to_minor_units() {
                return Err(LineError::DiscountedAbovePrice(
                    discounted.to_minor_units(),
                    draft.unit_price.to_minor_units(),
                ));
            }
        }

        let quantity = clamp_quantity(i64::from(draft.quantity), draft.max_quantity);

        Ok(Self {
            id,
            name: draft.name,
            brand: draft.brand,
            color: draft.color,
            image: draft.image,
            unit_price: draft.unit_price,
            discounted_unit_price: draft.discounted_unit_price,
            discount_percent: draft.discount_percent,
            quantity,
            max_quantity: draft.max_quantity,
            in_stock: draft.in_stock,
            selected,
        })
    }

    /// The line id.
    #[must_use]
    pub fn id(&self) -> LineId {
        self.id
    }

    /// The product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The product brand.
    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// The chosen colour variant.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// The display image path.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The pre-discount unit price.
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// The discounted unit price, if the product is discounted.
    pub fn discounted_unit_price(&self) -> Option<&Money<'static, Currency>> {
        self.discounted_unit_price.as_ref()
    }

    /// The unit price charged for this line: discounted if present, full otherwise.
    pub fn effective_price(&self) -> &Money<'static, Currency> {
        self.discounted_unit_price
            .as_ref()
            .unwrap_or(&self.unit_price)
    }

    /// The informational discount percentage.
    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    /// The current quantity, always within `[1, max_quantity]`.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The stock ceiling for the quantity.
    #[must_use]
    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    /// Whether the product is in stock.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.in_stock
    }

    /// Whether this line participates in checkout totals.
    #[must_use]
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// The effective price times the quantity, in minor units.
    pub(crate) fn total_minor(&self) -> i64 {
        self.effective_price().to_minor_units() * i64::from(self.quantity)
    }

    /// Whether this line represents the same product variant as the draft.
    pub(crate) fn matches(&self, name: &str, color: &str) -> bool {
        self.name == name && self.color == color
    }

    /// Add a signed delta to the quantity, clamped into `[1, max_quantity]`.
    pub(crate) fn add_quantity(&mut self, delta: i64) {
        self.quantity = clamp_quantity(i64::from(self.quantity).saturating_add(delta), self.max_quantity);
    }

    /// Set the quantity to an absolute value, clamped into `[1, max_quantity]`.
    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        self.quantity = clamp_quantity(quantity, self.max_quantity);
    }

    /// Set the selection flag.
    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// Clamp a requested quantity into `[1, max_quantity]`.
///
/// The floor of 1 wins over the ceiling, so a line with `max_quantity` of 0
/// still clamps to 1. Non-positive requests also clamp to 1.
fn clamp_quantity(requested: i64, max_quantity: u32) -> u32 {
    let capped = requested.min(i64::from(max_quantity));
    let floored = if capped < 1 { 1 } else { capped };

    u32::try_from(floored).unwrap_or(1)
}
