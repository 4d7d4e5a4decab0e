//! Cart Snapshots
//!
//! The durable key/value port the store persists through, plus the serialized
//! snapshot format. The whole line list is the unit of persistence: one YAML
//! document with the cart currency and a record per line, written in full on
//! every mutation and read once at store initialization.

use std::{
    cell::RefCell,
    fs, io,
    path::PathBuf,
    rc::Rc,
};

use rust_decimal::Decimal;
use rusty_money::{Findable, Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lines::{CartLine, LineDraft, LineError, LineId};

/// Errors from snapshot encoding, decoding, or the backing storage.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error from the backing storage.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// YAML (de)serialization error.
    #[error("Failed to parse snapshot: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The snapshot names a currency this build does not know.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A line record failed validation on restore.
    #[error("Invalid line record: {0}")]
    InvalidLine(#[from] LineError),
}

/// Durable key/value slot for one serialized cart snapshot.
///
/// The store depends on this port by interface only; a file, an embedded
/// database, or a remote API can all stand behind it.
pub trait SnapshotStore {
    /// Load the most recently saved snapshot text, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the backing storage cannot be read.
    /// A missing snapshot is `Ok(None)`, not an error.
    fn load(&self) -> Result<Option<String>, SnapshotError>;

    /// Persist snapshot text, replacing any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the backing storage cannot be written.
    fn save(&self, contents: &str) -> Result<(), SnapshotError>;
}

/// Top-level serialized snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// ISO alpha code of the currency all line prices are in.
    pub currency: String,

    /// One record per cart line, in cart order.
    pub lines: Vec<LineRecord>,
}

/// Serialized form of one cart line. Prices are in minor units.
#[derive(Debug, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line id.
    pub id: u64,

    /// Product name.
    pub name: String,

    /// Product brand.
    pub brand: String,

    /// Colour variant.
    pub color: String,

    /// Display image path.
    pub image: String,

    /// Pre-discount unit price in minor units.
    pub unit_price: i64,

    /// Discounted unit price in minor units, if discounted.
    pub discounted_unit_price: Option<i64>,

    /// Informational discount percentage.
    pub discount_percent: Decimal,

    /// Current quantity.
    pub quantity: u32,

    /// Stock ceiling.
    pub max_quantity: u32,

    /// Availability flag.
    pub in_stock: bool,

    /// Whether the line participates in checkout totals.
    pub selected: bool,
}

impl From<&CartLine> for LineRecord {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id().raw(),
            name: line.name().to_string(),
            brand: line.brand().to_string(),
            color: line.color().to_string(),
            image: line.image().to_string(),
            unit_price: line.unit_price().to_minor_units(),
            discounted_unit_price: line.discounted_unit_price().map(Money::to_minor_units),
            discount_percent: line.discount_percent(),
            quantity: line.quantity(),
            max_quantity: line.max_quantity(),
            in_stock: line.in_stock(),
            selected: line.selected(),
        }
    }
}

/// Serialize the line list to snapshot text.
///
/// # Errors
///
/// Returns a [`SnapshotError::Yaml`] if serialization fails.
pub fn encode(lines: &[CartLine], currency: &'static Currency) -> Result<String, SnapshotError> {
    let snapshot = CartSnapshot {
        currency: currency.iso_alpha_code.to_string(),
        lines: lines.iter().map(LineRecord::from).collect(),
    };

    Ok(serde_norway::to_string(&snapshot)?)
}

/// Parse snapshot text back into cart lines and their currency.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the text is not valid YAML, the currency
/// code is unknown, or a line record fails validation.
pub fn decode(contents: &str) -> Result<(Vec<CartLine>, &'static Currency), SnapshotError> {
    let snapshot: CartSnapshot = serde_norway::from_str(contents)?;

    let currency = Currency::find(&snapshot.currency)
        .ok_or_else(|| SnapshotError::UnknownCurrency(snapshot.currency.clone()))?;

    let lines = snapshot
        .lines
        .into_iter()
        .map(|record| restore_line(record, currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((lines, currency))
}

fn restore_line(
    record: LineRecord,
    currency: &'static Currency,
) -> Result<CartLine, SnapshotError> {
    let draft = LineDraft {
        name: record.name,
        brand: record.brand,
        color: record.color,
        image: record.image,
        unit_price: Money::from_minor(record.unit_price, currency),
        discounted_unit_price: record
            .discounted_unit_price
            .map(|minor| Money::from_minor(minor, currency)),
        discount_percent: record.discount_percent,
        quantity: record.quantity,
        max_quantity: record.max_quantity,
        in_stock: record.in_stock,
    };

    Ok(CartLine::from_draft(
        LineId::new(record.id),
        draft,
        record.selected,
    )?)
}

/// Stores the snapshot as a single file on disk.
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<String>, SnapshotError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SnapshotError::Io(err)),
        }
    }

    fn save(&self, contents: &str) -> Result<(), SnapshotError> {
        Ok(fs::write(&self.path, contents)?)
    }
}

/// Stores the snapshot in a shared in-memory slot.
///
/// Clones share the same slot, so a second store opened from a clone observes
/// what the first one saved. Useful for tests and ephemeral carts.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemorySnapshotStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw snapshot text.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(contents.into()))),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<String>, SnapshotError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, contents: &str) -> Result<(), SnapshotError> {
        *self.slot.borrow_mut() = Some(contents.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn test_lines() -> TestResult<Vec<CartLine>> {
        let first = CartLine::from_draft(
            LineId::new(1),
            LineDraft {
                name: "Trail Jacket".to_string(),
                brand: "Northfield".to_string(),
                color: "Green".to_string(),
                image: "/images/trail-jacket.png".to_string(),
                unit_price: Money::from_minor(10_000, USD),
                discounted_unit_price: Some(Money::from_minor(9_000, USD)),
                discount_percent: Decimal::new(10, 0),
                quantity: 2,
                max_quantity: 5,
                in_stock: true,
            },
            true,
        )?;

        let second = CartLine::from_draft(
            LineId::new(2),
            LineDraft {
                name: "Canvas Tote".to_string(),
                brand: "Harbor".to_string(),
                color: "Natural".to_string(),
                image: "/images/canvas-tote.png".to_string(),
                unit_price: Money::from_minor(2_500, USD),
                discounted_unit_price: None,
                discount_percent: Decimal::ZERO,
                quantity: 1,
                max_quantity: 3,
                in_stock: true,
            },
            false,
        )?;

        Ok(vec![first, second])
    }

    #[test]
    fn round_trip_preserves_lines() -> TestResult {
        let lines = test_lines()?;

        let text = encode(&lines, USD)?;
        let (restored, currency) = decode(&text)?;

        assert_eq!(currency, USD);
        assert_eq!(restored, lines);

        Ok(())
    }

    #[test]
    fn decode_rejects_malformed_text() {
        assert!(decode("not: [valid").is_err());
        assert!(decode("currency: USD").is_err());
    }

    #[test]
    fn decode_rejects_unknown_currency() {
        let text = "currency: ZZZ\nlines: []\n";

        assert!(matches!(
            decode(text),
            Err(SnapshotError::UnknownCurrency(code)) if code == "ZZZ"
        ));
    }

    #[test]
    fn decode_rejects_invalid_line_record() -> TestResult {
        let text = encode(&test_lines()?, USD)?;

        // Corrupt the discounted price above the unit price.
        let corrupted = text.replace("discounted_unit_price: 9000", "discounted_unit_price: 90000");

        assert!(matches!(
            decode(&corrupted),
            Err(SnapshotError::InvalidLine(_))
        ));

        Ok(())
    }

    #[test]
    fn decode_restores_snapshot_currency() -> TestResult {
        let lines = [CartLine::from_draft(
            LineId::new(7),
            LineDraft {
                name: "Mug".to_string(),
                brand: "Harbor".to_string(),
                color: "White".to_string(),
                image: String::new(),
                unit_price: Money::from_minor(899, GBP),
                discounted_unit_price: None,
                discount_percent: Decimal::ZERO,
                quantity: 1,
                max_quantity: 2,
                in_stock: true,
            },
            true,
        )?];

        let text = encode(&lines, GBP)?;
        let (_, currency) = decode(&text)?;

        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn file_store_missing_file_is_none() {
        let store = FileSnapshotStore::new("/nonexistent/trolley-cart.yml");

        assert!(matches!(store.load(), Ok(None)));
    }

    #[test]
    fn file_store_round_trips_contents() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileSnapshotStore::new(dir.path().join("cart.yml"));

        store.save("currency: USD\nlines: []\n")?;

        assert_eq!(store.load()?.as_deref(), Some("currency: USD\nlines: []\n"));

        Ok(())
    }

    #[test]
    fn memory_store_clones_share_the_slot() -> TestResult {
        let store = MemorySnapshotStore::new();
        let other = store.clone();

        store.save("currency: USD\nlines: []\n")?;

        assert!(other.load()?.is_some());

        Ok(())
    }
}
