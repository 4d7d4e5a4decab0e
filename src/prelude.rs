//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    checkout::{OrderSummary, PromoCode, can_checkout},
    lines::{CartLine, LineDraft, LineError, LineId},
    products::Product,
    snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore},
    stats::CartStats,
    store::{CartError, CartStore},
};
