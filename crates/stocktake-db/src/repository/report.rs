//! # Report Repository (Reporting Engine)
//!
//! Derives per-product and grand-total aggregates from the ledger.
//!
//! Two views, deliberately not collapsed into one:
//!
//! - [`ReportRepository::summarize`] - products **with activity** only,
//!   pushed down to SQL (`SUM` + `GROUP BY` + inner join).
//! - [`ReportRepository::full_ledger`] - **every** product including
//!   zero-count ones, assembled in-process by `stocktake_core::report` so
//!   ordering never depends on the storage engine's defaults.
//!
//! Both are plain-data results; no storage handles leak to presentation
//! adapters.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stocktake_core::report::build_full_ledger;
use stocktake_core::{FullLedger, LedgerEntry, Product, SummaryReport, SummaryRow};

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SummaryRecord {
    code: String,
    name: String,
    total_quantity: i64,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Aggregate summary: per-product subtotal and grand total.
    ///
    /// Inner-join semantics - a product with zero counts contributes
    /// nothing and is omitted. Rows are ordered by product code ascending;
    /// the `ORDER BY` is explicit, repeated calls over the same data return
    /// identical output.
    pub async fn summarize(&self) -> DbResult<SummaryReport> {
        let records = sqlx::query_as::<_, SummaryRecord>(
            r#"
            SELECT
                p.code AS code,
                p.name AS name,
                SUM(c.quantity) AS total_quantity
            FROM counts c
            INNER JOIN products p ON p.id = c.product_id
            GROUP BY p.id, p.code, p.name
            ORDER BY p.code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let rows: Vec<SummaryRow> = records
            .into_iter()
            .map(|r| SummaryRow {
                code: r.code,
                name: r.name,
                total_quantity: r.total_quantity,
            })
            .collect();

        let grand_total = rows.iter().map(|r| r.total_quantity).sum();

        debug!(rows = rows.len(), grand_total, "Built summary report");

        Ok(SummaryReport { rows, grand_total })
    }

    /// Full ledger view: every product with its batch lines and subtotal.
    ///
    /// Products with zero counts are included (empty batch list, subtotal
    /// 0) - this is the export-facing contract, distinct from
    /// [`summarize`](Self::summarize). Ordering (code, then batch) is
    /// imposed by the pure assembly in `stocktake-core`, not by the store.
    pub async fn full_ledger(&self) -> DbResult<FullLedger> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, created_at, updated_at FROM products",
        )
        .fetch_all(&self.pool)
        .await?;

        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                c.id,
                c.batch,
                c.expiry_month,
                c.expiry_year,
                c.quantity,
                p.code AS product_code,
                p.name AS product_name
            FROM counts c
            INNER JOIN products p ON p.id = c.product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(
            products = products.len(),
            entries = entries.len(),
            "Assembling full ledger"
        );

        Ok(build_full_ledger(products, entries))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
