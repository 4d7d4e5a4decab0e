//! Cart Statistics

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::lines::CartLine;

/// Read-only statistics derived from the current cart lines.
///
/// Recomputed in full on every [`compute`](CartStats::compute); nothing is
/// cached between mutations.
#[derive(Debug)]
pub struct CartStats<'a> {
    total_items: u64,
    selected_items: SmallVec<[&'a CartLine; 8]>,
    total_price: Money<'static, Currency>,
    selected_total_price: Money<'static, Currency>,
    all_selected: bool,
    some_selected: bool,
}

impl<'a> CartStats<'a> {
    /// Derive statistics from the given lines.
    ///
    /// All lines are assumed to share `currency`; the store enforces this at
    /// the `add_item` boundary, so the sums here cannot mismatch.
    #[must_use]
    pub fn compute(lines: &'a [CartLine], currency: &'static Currency) -> Self {
        let total_items = lines.iter().map(|line| u64::from(line.quantity())).sum();

        let selected_items: SmallVec<[&'a CartLine; 8]> =
            lines.iter().filter(|line| line.selected()).collect();

        let total_minor: i64 = lines.iter().map(CartLine::total_minor).sum();

        let selected_minor: i64 = selected_items
            .iter()
            .map(|line| line.total_minor())
            .sum();

        Self {
            total_items,
            total_price: Money::from_minor(total_minor, currency),
            selected_total_price: Money::from_minor(selected_minor, currency),
            all_selected: !lines.is_empty() && lines.iter().all(CartLine::selected),
            some_selected: lines.iter().any(CartLine::selected),
            selected_items,
        }
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// The selected lines, in cart order.
    pub fn selected_items(&self) -> &[&'a CartLine] {
        &self.selected_items
    }

    /// Sum of `effective_price × quantity` over all lines.
    pub fn total_price(&self) -> &Money<'static, Currency> {
        &self.total_price
    }

    /// Sum of `effective_price × quantity` over the selected lines.
    pub fn selected_total_price(&self) -> &Money<'static, Currency> {
        &self.selected_total_price
    }

    /// True iff the cart is non-empty and every line is selected.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.all_selected
    }

    /// True iff at least one line is selected.
    #[must_use]
    pub fn some_selected(&self) -> bool {
        self.some_selected
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::lines::{LineDraft, LineId};

    use super::*;

    fn line(id: u64, minor: i64, discounted: Option<i64>, quantity: u32, selected: bool) -> CartLine {
        let draft = LineDraft {
            name: format!("Product {id}"),
            brand: "Brand".to_string(),
            color: "Black".to_string(),
            image: String::new(),
            unit_price: Money::from_minor(minor, USD),
            discounted_unit_price: discounted.map(|m| Money::from_minor(m, USD)),
            discount_percent: Decimal::ZERO,
            quantity,
            max_quantity: 10,
            in_stock: true,
        };

        match CartLine::from_draft(LineId::new(id), draft, selected) {
            Ok(line) => line,
            Err(err) => panic!("test line should be valid: {err}"),
        }
    }

    #[test]
    fn compute_on_empty_cart_is_all_zero() {
        let stats = CartStats::compute(&[], USD);

        assert_eq!(stats.total_items(), 0);
        assert!(stats.selected_items().is_empty());
        assert_eq!(stats.total_price(), &Money::from_minor(0, USD));
        assert_eq!(stats.selected_total_price(), &Money::from_minor(0, USD));
        assert!(!stats.all_selected());
        assert!(!stats.some_selected());
    }

    #[test]
    fn total_items_sums_quantities() {
        let lines = [line(1, 100, None, 2, true), line(2, 200, None, 3, false)];

        let stats = CartStats::compute(&lines, USD);

        assert_eq!(stats.total_items(), 5);
    }

    #[test]
    fn totals_use_discounted_price_when_present() {
        let lines = [line(1, 10_000, Some(9_000), 2, true), line(2, 500, None, 1, false)];

        let stats = CartStats::compute(&lines, USD);

        assert_eq!(stats.total_price(), &Money::from_minor(18_500, USD));
        assert_eq!(stats.selected_total_price(), &Money::from_minor(18_000, USD));
    }

    #[test]
    fn selected_items_preserve_cart_order() {
        let lines = [
            line(1, 100, None, 1, true),
            line(2, 200, None, 1, false),
            line(3, 300, None, 1, true),
        ];

        let stats = CartStats::compute(&lines, USD);

        let ids: Vec<u64> = stats
            .selected_items()
            .iter()
            .map(|l| l.id().raw())
            .collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn all_selected_requires_non_empty_cart() {
        let none: [CartLine; 0] = [];
        let all = [line(1, 100, None, 1, true), line(2, 200, None, 1, true)];
        let some = [line(1, 100, None, 1, true), line(2, 200, None, 1, false)];

        assert!(!CartStats::compute(&none, USD).all_selected());
        assert!(CartStats::compute(&all, USD).all_selected());
        assert!(!CartStats::compute(&some, USD).all_selected());
        assert!(CartStats::compute(&some, USD).some_selected());
    }
}
