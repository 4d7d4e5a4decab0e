//! Cart Store
//!
//! The single mutation and query surface for every cart-displaying view. The
//! store owns the ordered line list, keeps it durable through a
//! [`SnapshotStore`] port, and derives read-only statistics on demand.

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    lines::{CartLine, LineDraft, LineError, LineId},
    snapshot::{self, SnapshotStore},
    stats::CartStats,
};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A draft's currency differs from the cart currency.
    #[error("Line has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The draft failed line validation.
    #[error(transparent)]
    Line(#[from] LineError),
}

/// Cart store: the ordered collection of cart lines plus its persistence.
///
/// Initialization is single-shot: the store starts in the loading state,
/// [`load`](CartStore::load) performs the one-time snapshot read, and the
/// store never re-enters loading afterwards. Mutations before the load
/// completes operate on in-memory state but are not persisted, matching the
/// reference behavior of gating saves on the load having finished.
///
/// Persistence is fire-and-forget per mutation: a failed write is logged and
/// the in-memory state stays authoritative for the session.
#[derive(Debug)]
pub struct CartStore<S: SnapshotStore> {
    lines: Vec<CartLine>,
    currency: &'static Currency,
    next_id: u64,
    loading: bool,
    snapshots: S,
}

impl<S: SnapshotStore> CartStore<S> {
    /// Create a store in the loading state, before its snapshot read.
    pub fn new(currency: &'static Currency, snapshots: S) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            next_id: 1,
            loading: true,
            snapshots,
        }
    }

    /// Create a store and immediately perform its snapshot read.
    pub fn open(currency: &'static Currency, snapshots: S) -> Self {
        let mut store = Self::new(currency, snapshots);
        store.load();

        store
    }

    /// Perform the one-shot snapshot read.
    ///
    /// A missing, malformed, or wrong-currency snapshot degrades to an empty
    /// cart with a logged warning; no error reaches the caller. Calls after
    /// the first are no-ops.
    pub fn load(&mut self) {
        if !self.loading {
            return;
        }

        self.loading = false;

        let contents = match self.snapshots.load() {
            Ok(Some(contents)) => contents,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read cart snapshot; starting empty");
                return;
            }
        };

        match snapshot::decode(&contents) {
            Ok((lines, currency)) if currency == self.currency => {
                self.next_id = lines
                    .iter()
                    .map(|line| line.id().raw())
                    .max()
                    .map_or(1, |max| max.saturating_add(1));

                self.lines = lines;
            }
            Ok((_, currency)) => {
                tracing::warn!(
                    snapshot_currency = currency.iso_alpha_code,
                    cart_currency = self.currency.iso_alpha_code,
                    "cart snapshot currency mismatch; starting empty"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse cart snapshot; starting empty");
            }
        }
    }

    /// Whether the initial snapshot read is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The cart lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The cart currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Derive the current cart statistics.
    pub fn stats(&self) -> CartStats<'_> {
        CartStats::compute(&self.lines, self.currency)
    }

    /// Add a draft to the cart.
    ///
    /// If a line for the same name and colour already exists, its quantity is
    /// incremented by the draft quantity (clamped to the line's stock
    /// ceiling) instead of adding a duplicate row. Otherwise the draft
    /// becomes a new, selected line with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the draft's currency differs from the cart
    /// currency or the draft fails line validation.
    pub fn add_item(&mut self, draft: LineDraft) -> Result<LineId, CartError> {
        let draft_currency = draft.unit_price.currency();

        if draft_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                draft_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(&draft.name, &draft.color))
        {
            existing.add_quantity(i64::from(draft.quantity));
            let id = existing.id();
            self.persist();

            return Ok(id);
        }

        let id = LineId::new(self.next_id);
        let line = CartLine::from_draft(id, draft, true)?;

        self.next_id = self.next_id.saturating_add(1);
        self.lines.push(line);
        self.persist();

        Ok(id)
    }

    /// Remove the line with the given id. No-op if absent.
    pub fn remove_item(&mut self, id: LineId) {
        self.lines.retain(|line| line.id() != id);
        self.persist();
    }

    /// Add a signed delta to a line's quantity, clamped to `[1, max_quantity]`.
    ///
    /// No-op if the id is absent.
    pub fn update_quantity(&mut self, id: LineId, delta: i64) {
        if let Some(line) = self.line_mut(id) {
            line.add_quantity(delta);
        }

        self.persist();
    }

    /// Set a line's quantity to an absolute value, clamped to `[1, max_quantity]`.
    ///
    /// Non-positive input degrades to the clamp floor of 1. No-op if the id
    /// is absent.
    pub fn set_quantity(&mut self, id: LineId, quantity: i64) {
        if let Some(line) = self.line_mut(id) {
            line.set_quantity(quantity);
        }

        self.persist();
    }

    /// Flip the selection flag on one line. No-op if the id is absent.
    pub fn toggle_selection(&mut self, id: LineId) {
        if let Some(line) = self.line_mut(id) {
            let selected = line.selected();
            line.set_selected(!selected);
        }

        self.persist();
    }

    /// Set every line's selection to the negation of the current aggregate:
    /// select all unless every line is already selected, else deselect all.
    pub fn toggle_select_all(&mut self) {
        let all_selected = !self.lines.is_empty() && self.lines.iter().all(CartLine::selected);

        for line in &mut self.lines {
            line.set_selected(!all_selected);
        }

        self.persist();
    }

    /// Drop every selected line.
    pub fn remove_selected(&mut self) {
        self.lines.retain(|line| !line.selected());
        self.persist();
    }

    /// Empty the cart entirely.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    fn line_mut(&mut self, id: LineId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }

    /// Write the full snapshot through the port. Failures are logged and
    /// never roll back the in-memory mutation. Skipped while loading.
    fn persist(&self) {
        if self.loading {
            return;
        }

        let contents = match snapshot::encode(&self.lines, self.currency) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize cart snapshot");
                return;
            }
        };

        if let Err(err) = self.snapshots.save(&contents) {
            tracing::warn!(error = %err, "failed to persist cart snapshot");
        }
    }
}
