//! Products

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::lines::LineDraft;

/// Catalog product record that seeds new cart lines.
///
/// The cart store does not validate catalog data beyond the line invariants;
/// keeping `discounted_price` consistent with `discount_percent` is the
/// catalog's job.
#[derive(Debug, Clone)]
pub struct Product {
    /// Product name.
    pub name: String,

    /// Product brand.
    pub brand: String,

    /// Available colour variants.
    pub colors: Vec<String>,

    /// Display image path.
    pub image: String,

    /// Pre-discount price.
    pub price: Money<'static, Currency>,

    /// Discounted price, if the product is on offer.
    pub discounted_price: Option<Money<'static, Currency>>,

    /// Informational discount percentage.
    pub discount_percent: Decimal,

    /// Units in stock; becomes the cart line's quantity ceiling.
    pub stock: u32,
}

impl Product {
    /// Build a cart line draft for one colour of this product.
    pub fn draft(&self, color: impl Into<String>, quantity: u32) -> LineDraft {
        LineDraft {
            name: self.name.clone(),
            brand: self.brand.clone(),
            color: color.into(),
            image: self.image.clone(),
            unit_price: self.price,
            discounted_unit_price: self.discounted_price,
            discount_percent: self.discount_percent,
            quantity,
            max_quantity: self.stock,
            in_stock: self.stock > 0,
        }
    }
}
