//! # Report Assembly
//!
//! Pure, deterministic assembly of reporting views from ledger rows.
//!
//! ## Two Views, Two Questions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SummaryReport   "How much of each active product do we have?"         │
//! │  ├── inner-join semantics: zero-count products are omitted             │
//! │  └── one row per product: code, name, subtotal                         │
//! │                                                                         │
//! │  FullLedger      "What does the whole shelf look like, per batch?"     │
//! │  ├── every product appears, zero-count ones with an empty section      │
//! │  └── batch lines ordered by batch within each product                  │
//! │                                                                         │
//! │  Both ordered by product code ascending. Neither relies on the         │
//! │  storage engine's default ordering - sorting happens right here.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The storage layer feeds these functions plain rows; everything order-
//! and grouping-related lives in this module so repeated calls over the
//! same data always produce identical output.

use std::collections::BTreeMap;

use crate::types::{
    BatchLine, FullLedger, LedgerEntry, Product, ProductLedger, SummaryReport, SummaryRow,
};

/// Builds the full ledger view: every product, every batch, grand total.
///
/// Products with no counts are included with an empty batch list and a
/// subtotal of 0. Products are ordered by code ascending, batch lines by
/// batch ascending within each product.
///
/// Entries are expected to come from a join, so every `product_code`
/// resolves to one of `products`; an entry that doesn't is dropped (the
/// storage layer has already flagged it as an integrity fault).
pub fn build_full_ledger(products: Vec<Product>, entries: Vec<LedgerEntry>) -> FullLedger {
    // BTreeMap keyed by code gives the ascending code order for free.
    let mut sections: BTreeMap<String, ProductLedger> = products
        .into_iter()
        .map(|p| {
            (
                p.code.clone(),
                ProductLedger {
                    code: p.code,
                    name: p.name,
                    batches: Vec::new(),
                    subtotal: 0,
                },
            )
        })
        .collect();

    for entry in entries {
        if let Some(section) = sections.get_mut(&entry.product_code) {
            section.subtotal += entry.quantity;
            section.batches.push(BatchLine {
                batch: entry.batch,
                expiry_month: entry.expiry_month,
                expiry_year: entry.expiry_year,
                quantity: entry.quantity,
            });
        }
    }

    let mut products: Vec<ProductLedger> = sections.into_values().collect();
    for section in &mut products {
        section.batches.sort_by(|a, b| a.batch.cmp(&b.batch));
    }

    let grand_total = products.iter().map(|p| p.subtotal).sum();

    FullLedger {
        products,
        grand_total,
    }
}

/// Builds the activity-only summary from joined ledger rows.
///
/// This is the in-process fallback for stores that cannot run a grouped
/// aggregate; it must produce exactly what the SQL `SUM`/`GROUP BY` path
/// produces: one row per product **with activity**, ordered by code.
pub fn build_summary(entries: &[LedgerEntry]) -> SummaryReport {
    let mut totals: BTreeMap<String, SummaryRow> = BTreeMap::new();

    for entry in entries {
        totals
            .entry(entry.product_code.clone())
            .and_modify(|row| row.total_quantity += entry.quantity)
            .or_insert_with(|| SummaryRow {
                code: entry.product_code.clone(),
                name: entry.product_name.clone(),
                total_quantity: entry.quantity,
            });
    }

    let rows: Vec<SummaryRow> = totals.into_values().collect();
    let grand_total = rows.iter().map(|r| r.total_quantity).sum();

    SummaryReport { rows, grand_total }
}

// =============================================================================
// Unit Tests
// =============================================================================
