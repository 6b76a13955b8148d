//! # Domain Types
//!
//! Core domain types for the stocktake system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   StockCount    │   │   LedgerEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  count fields   │       │
//! │  │  code (business)│   │  product_id(FK) │   │  + product code │       │
//! │  │  name           │   │  batch          │   │  + product name │       │
//! │  └─────────────────┘   │  expiry m/y     │   └─────────────────┘       │
//! │                        │  quantity       │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Derived (never persisted):                                             │
//! │  SummaryReport ── per-product subtotals, activity only                  │
//! │  FullLedger    ── every product, every batch, grand total               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (`code`, or (`product`, `batch`)) - human-readable, mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A product known to the registry.
///
/// Counts are owned exclusively by their product: deleting a product
/// cascades to every count referencing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier - unique, assigned externally, never generated.
    pub code: String,

    /// Display name shown on reports.
    pub name: String,

    /// When the product was registered.
    pub created_at: DateTime<Utc>,

    /// When the product was last renamed.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Stock Count
// =============================================================================

/// A ledger entry: the counted quantity of one batch of one product.
///
/// At most one row exists per (product, batch) pair. Repeated submissions
/// for the same pair are merged: quantity is accumulated, expiry fields are
/// overwritten with the latest submitted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockCount {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning product (foreign key, cascade on delete).
    pub product_id: String,

    /// Batch identifier, unique within the owning product.
    pub batch: String,

    /// Expiry month, 1-12.
    pub expiry_month: i64,

    /// Expiry year, 4 digits.
    pub expiry_year: i64,

    /// Accumulated counted quantity, never negative.
    pub quantity: i64,

    /// When the first submission for this (product, batch) arrived.
    pub created_at: DateTime<Utc>,

    /// When the last submission or update touched this row.
    pub updated_at: DateTime<Utc>,
}

impl StockCount {
    /// Expiry formatted as `MM/YYYY` for display.
    pub fn expiry_label(&self) -> String {
        format!("{:02}/{}", self.expiry_month, self.expiry_year)
    }
}

/// How a submission was applied to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// First submission for this (product, batch): a new row was created.
    Created,
    /// A row already existed: quantity was added, expiry overwritten.
    Merged,
}

/// A partial update for a count: only supplied fields change.
///
/// Unlike a submission, an update **overwrites** quantity instead of adding
/// to it. Used for corrections after a miscount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountPatch {
    pub batch: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub quantity: Option<i64>,
}

impl CountPatch {
    /// True when no field is supplied; such a patch is a no-op.
    pub fn is_empty(&self) -> bool {
        self.batch.is_none()
            && self.expiry_month.is_none()
            && self.expiry_year.is_none()
            && self.quantity.is_none()
    }
}

// =============================================================================
// Ledger Entry (join row)
// =============================================================================

/// A count joined with its owning product's code and name.
///
/// This is the shape `CountRepository::list_all` returns and the raw
/// material for full-ledger assembly. Every entry is guaranteed to have
/// resolved its owner; an orphan count is a referential-integrity fault
/// caught at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    /// Count identifier (UUID v4).
    pub id: String,

    /// Batch identifier.
    pub batch: String,

    /// Expiry month, 1-12.
    pub expiry_month: i64,

    /// Expiry year, 4 digits.
    pub expiry_year: i64,

    /// Accumulated quantity.
    pub quantity: i64,

    /// Owning product's business code.
    pub product_code: String,

    /// Owning product's display name.
    pub product_name: String,
}

// =============================================================================
// Summary Report (activity only)
// =============================================================================

/// One row of the aggregate summary: a product with at least one count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub code: String,
    pub name: String,
    /// Sum of quantities across all batches of this product.
    pub total_quantity: i64,
}

/// Aggregate summary over the whole ledger.
///
/// Only products with activity appear; rows are ordered by product code
/// ascending. Products with zero counts are a [`FullLedger`] concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub rows: Vec<SummaryRow>,
    /// Sum of every per-product subtotal.
    pub grand_total: i64,
}

// =============================================================================
// Full Ledger (every product)
// =============================================================================

/// One batch line inside a product's ledger section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchLine {
    pub batch: String,
    pub expiry_month: i64,
    pub expiry_year: i64,
    pub quantity: i64,
}

impl BatchLine {
    /// Expiry formatted as `MM/YYYY` for display.
    pub fn expiry_label(&self) -> String {
        format!("{:02}/{}", self.expiry_month, self.expiry_year)
    }
}

/// One product's section of the full ledger.
///
/// A product with no counts still gets a section: empty `batches`,
/// `subtotal` 0. Presentation adapters render that as a placeholder row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLedger {
    pub code: String,
    pub name: String,
    /// Batch lines, ordered by batch ascending.
    pub batches: Vec<BatchLine>,
    /// Sum of quantities across `batches` (0 when empty).
    pub subtotal: i64,
}

/// The full ledger view handed to presentation adapters.
///
/// Products are ordered by code ascending; the ordering and values are
/// identical across repeated calls over the same data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullLedger {
    pub products: Vec<ProductLedger>,
    pub grand_total: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
