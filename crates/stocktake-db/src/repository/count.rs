//! # Count Repository (Count Ledger)
//!
//! Owns count records keyed by (product, batch) and enforces the
//! merge-on-duplicate rule.
//!
//! ## Submit: Merge-or-Insert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │        submit("A-100", "L1", month, year, qty)  [one transaction]       │
//! │                                                                         │
//! │  resolve product by code ──── absent? → ProductNotFound                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT count WHERE (product, trimmed batch)                           │
//! │       │                                                                 │
//! │       ├── found:   quantity += qty          (additive)                 │
//! │       │            expiry    = month/year   (overwritten)              │
//! │       │            → Merged                                             │
//! │       │                                                                 │
//! │       └── absent:  INSERT new row                                      │
//! │                    │  UNIQUE index fired? → DuplicateBatch             │
//! │                    │  (concurrent submit won the race; not fatal)      │
//! │                    → Created                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT - no interleaving can produce a second (product, batch) row    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! State machine per (product, batch) slot: Absent → Present on first
//! submit; Present → Present on later submits or updates; Present → Absent
//! on delete or owning-product cascade. Nothing else; no soft delete, no
//! history.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocktake_core::validation::{
    validate_batch, validate_expiry_month, validate_expiry_year, validate_product_code,
    validate_quantity, validate_uuid,
};
use stocktake_core::{CountPatch, LedgerEntry, Product, StockCount, SubmitOutcome, ValidationError};

/// Repository for count ledger operations.
#[derive(Debug, Clone)]
pub struct CountRepository {
    pool: SqlitePool,
}

const COUNT_COLUMNS: &str =
    "id, product_id, batch, expiry_month, expiry_year, quantity, created_at, updated_at";

/// Join row for `list_all`. The product side is nullable so an orphan
/// count surfaces as an integrity fault instead of silently vanishing
/// behind an inner join.
#[derive(sqlx::FromRow)]
struct JoinedRow {
    id: String,
    batch: String,
    expiry_month: i64,
    expiry_year: i64,
    quantity: i64,
    product_code: Option<String>,
    product_name: Option<String>,
}

impl CountRepository {
    /// Creates a new CountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CountRepository { pool }
    }

    /// Submits a count for (product, batch): merge-or-insert.
    ///
    /// Runs as a single transaction. If a count for the trimmed batch
    /// already exists, the submitted quantity is **added** and the expiry
    /// fields are **overwritten** with the submitted values; otherwise a
    /// new row is created.
    ///
    /// ## Returns
    /// * `Ok((count, SubmitOutcome::Merged))` - Existing row updated
    /// * `Ok((count, SubmitOutcome::Created))` - New row inserted
    /// * `Err(DbError::ProductNotFound)` - Unknown product code
    /// * `Err(DbError::Validation)` - Bad batch/month/year/quantity, or a
    ///   merged total that would exceed `i64::MAX`
    /// * `Err(DbError::DuplicateBatch)` - Lost a concurrent insert race
    pub async fn submit(
        &self,
        product_code: &str,
        batch: &str,
        expiry_month: i64,
        expiry_year: i64,
        quantity: i64,
    ) -> DbResult<(StockCount, SubmitOutcome)> {
        let code = validate_product_code(product_code)?;
        let batch = validate_batch(batch)?;
        validate_expiry_month(expiry_month)?;
        validate_expiry_year(expiry_year)?;
        validate_quantity(quantity)?;

        debug!(code = %code, batch = %batch, quantity, "Submitting count");

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, created_at, updated_at FROM products WHERE code = ?1",
        )
        .bind(&code)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::ProductNotFound { code })?;

        let existing = sqlx::query_as::<_, StockCount>(&format!(
            "SELECT {COUNT_COLUMNS} FROM counts WHERE product_id = ?1 AND batch = ?2"
        ))
        .bind(&product.id)
        .bind(&batch)
        .fetch_optional(&mut *tx)
        .await?;

        let now = Utc::now();

        let (count, outcome) = match existing {
            Some(mut count) => {
                count.quantity = count.quantity.checked_add(quantity).ok_or_else(|| {
                    DbError::Validation(ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 0,
                        max: i64::MAX,
                    })
                })?;
                count.expiry_month = expiry_month;
                count.expiry_year = expiry_year;
                count.updated_at = now;

                sqlx::query(
                    r#"
                    UPDATE counts SET
                        quantity = ?2,
                        expiry_month = ?3,
                        expiry_year = ?4,
                        updated_at = ?5
                    WHERE id = ?1
                    "#,
                )
                .bind(&count.id)
                .bind(count.quantity)
                .bind(count.expiry_month)
                .bind(count.expiry_year)
                .bind(count.updated_at)
                .execute(&mut *tx)
                .await?;

                (count, SubmitOutcome::Merged)
            }
            None => {
                let count = StockCount {
                    id: Uuid::new_v4().to_string(),
                    product_id: product.id.clone(),
                    batch: batch.clone(),
                    expiry_month,
                    expiry_year,
                    quantity,
                    created_at: now,
                    updated_at: now,
                };

                sqlx::query(
                    r#"
                    INSERT INTO counts (
                        id, product_id, batch,
                        expiry_month, expiry_year, quantity,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                )
                .bind(&count.id)
                .bind(&count.product_id)
                .bind(&count.batch)
                .bind(count.expiry_month)
                .bind(count.expiry_year)
                .bind(count.quantity)
                .bind(count.created_at)
                .bind(count.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| match DbError::from(e) {
                    DbError::UniqueViolation { .. } => DbError::DuplicateBatch {
                        batch: count.batch.clone(),
                    },
                    other => other,
                })?;

                (count, SubmitOutcome::Created)
            }
        };

        tx.commit().await?;

        Ok((count, outcome))
    }

    /// Gets a count by its id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockCount>> {
        let count = sqlx::query_as::<_, StockCount>(&format!(
            "SELECT {COUNT_COLUMNS} FROM counts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }

    /// Updates a count: direct overwrite of any subset of fields.
    ///
    /// Quantity is **replaced**, not added - this is the correction path,
    /// not a submission. A patch with no fields set is rejected as a
    /// validation error. A batch change that collides with another count
    /// of the same product fails `DuplicateBatch` and leaves both rows
    /// untouched (single transaction, unique index as backstop).
    pub async fn update(&self, id: &str, patch: &CountPatch) -> DbResult<StockCount> {
        validate_uuid(id)?;

        if patch.is_empty() {
            return Err(DbError::Validation(ValidationError::Required {
                field: "fields".to_string(),
            }));
        }

        let mut tx = self.pool.begin().await?;

        let mut count = sqlx::query_as::<_, StockCount>(&format!(
            "SELECT {COUNT_COLUMNS} FROM counts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Count", id))?;

        if let Some(batch) = &patch.batch {
            count.batch = validate_batch(batch)?;
        }
        if let Some(month) = patch.expiry_month {
            validate_expiry_month(month)?;
            count.expiry_month = month;
        }
        if let Some(year) = patch.expiry_year {
            validate_expiry_year(year)?;
            count.expiry_year = year;
        }
        if let Some(quantity) = patch.quantity {
            validate_quantity(quantity)?;
            count.quantity = quantity;
        }
        count.updated_at = Utc::now();

        debug!(id = %count.id, batch = %count.batch, "Updating count");

        sqlx::query(
            r#"
            UPDATE counts SET
                batch = ?2,
                expiry_month = ?3,
                expiry_year = ?4,
                quantity = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&count.id)
        .bind(&count.batch)
        .bind(count.expiry_month)
        .bind(count.expiry_year)
        .bind(count.quantity)
        .bind(count.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::DuplicateBatch {
                batch: count.batch.clone(),
            },
            other => other,
        })?;

        tx.commit().await?;

        Ok(count)
    }

    /// Deletes a count by id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        validate_uuid(id)?;

        debug!(id = %id, "Deleting count");

        let result = sqlx::query("DELETE FROM counts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Count", id));
        }

        Ok(())
    }

    /// Lists every count joined with its owning product's code and name.
    ///
    /// A count whose product reference resolves to nothing is a
    /// referential-integrity fault: logged at error level and surfaced as
    /// `DbError::Integrity`, never as a business error.
    pub async fn list_all(&self) -> DbResult<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, JoinedRow>(
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
            LEFT JOIN products p ON p.id = c.product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| match (row.product_code, row.product_name) {
                (Some(product_code), Some(product_name)) => Ok(LedgerEntry {
                    id: row.id,
                    batch: row.batch,
                    expiry_month: row.expiry_month,
                    expiry_year: row.expiry_year,
                    quantity: row.quantity,
                    product_code,
                    product_name,
                }),
                _ => {
                    error!(count_id = %row.id, "Count references a missing product");
                    Err(DbError::integrity(format!(
                        "count {} references a missing product",
                        row.id
                    )))
                }
            })
            .collect()
    }

    /// Lists all counts of one product, ordered by batch.
    ///
    /// ## Returns
    /// * `Err(DbError::ProductNotFound)` - Unknown product code
    pub async fn list_for_product(&self, product_code: &str) -> DbResult<Vec<StockCount>> {
        let code = validate_product_code(product_code)?;

        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, created_at, updated_at FROM products WHERE code = ?1",
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::ProductNotFound { code })?;

        let counts = sqlx::query_as::<_, StockCount>(&format!(
            "SELECT {COUNT_COLUMNS} FROM counts WHERE product_id = ?1 ORDER BY batch"
        ))
        .bind(&product.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_submit_creates() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();

        let (count, outcome) = db
            .counts()
            .submit("A-100", "L1", 3, 2025, 10)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(count.batch, "L1");
        assert_eq!(count.quantity, 10);
        assert_eq!(count.expiry_month, 3);
        assert_eq!(count.expiry_year, 2025);
    }

    #[tokio::test]
    async fn test_resubmit_merges_quantity_and_overwrites_expiry() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();
        let (merged, outcome) = ledger.submit("A-100", "L1", 6, 2026, 5).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Merged);
        assert_eq!(merged.quantity, 15);
        assert_eq!(merged.expiry_month, 6);
        assert_eq!(merged.expiry_year, 2026);

        // Exactly one row for (product, batch).
        let counts = ledger.list_for_product("A-100").await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].quantity, 15);
    }

    #[tokio::test]
    async fn test_merge_past_i64_max_fails_and_leaves_row_untouched() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        let (count, _) = ledger
            .submit("A-100", "L1", 3, 2025, i64::MAX)
            .await
            .unwrap();

        let err = ledger.submit("A-100", "L1", 6, 2026, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Overflowing merge rolled back: quantity and expiry unchanged.
        let stored = ledger.get_by_id(&count.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, i64::MAX);
        assert_eq!(stored.expiry_month, 3);
        assert_eq!(stored.expiry_year, 2025);
    }

    #[tokio::test]
    async fn test_batch_is_trimmed_before_matching() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();
        let (_, outcome) = ledger.submit("A-100", "  L1  ", 3, 2025, 2).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Merged);
    }

    #[tokio::test]
    async fn test_batch_isolation_across_products() {
        let db = test_db().await;
        db.products().register("P1", "One").await.unwrap();
        db.products().register("P2", "Two").await.unwrap();
        let ledger = db.counts();

        let (_, o1) = ledger.submit("P1", "L1", 1, 2025, 10).await.unwrap();
        let (_, o2) = ledger.submit("P2", "L1", 1, 2025, 7).await.unwrap();

        // Same batch label, different products: two independent rows.
        assert_eq!(o1, SubmitOutcome::Created);
        assert_eq!(o2, SubmitOutcome::Created);
        assert_eq!(ledger.list_for_product("P1").await.unwrap()[0].quantity, 10);
        assert_eq!(ledger.list_for_product("P2").await.unwrap()[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_submit_unknown_product() {
        let db = test_db().await;

        let err = db
            .counts()
            .submit("NOPE", "L1", 1, 2025, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ProductNotFound { ref code } if code == "NOPE"));
    }

    #[tokio::test]
    async fn test_submit_rejects_malformed_input() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        assert!(matches!(
            ledger.submit("A-100", "L1", 13, 2025, 1).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            ledger.submit("A-100", "L1", 6, 26, 1).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            ledger.submit("A-100", "L1", 6, 2025, -5).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            ledger.submit("A-100", "   ", 6, 2025, 1).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_overwrites_instead_of_adding() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        let (count, _) = ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();

        let patch = CountPatch {
            quantity: Some(4),
            ..Default::default()
        };
        let updated = ledger.update(&count.id, &patch).await.unwrap();

        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.batch, "L1");
        assert_eq!(updated.expiry_month, 3);
    }

    #[tokio::test]
    async fn test_update_batch_collision_leaves_rows_untouched() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();
        let (l2, _) = ledger.submit("A-100", "L2", 4, 2025, 5).await.unwrap();

        let patch = CountPatch {
            batch: Some("L1".to_string()),
            ..Default::default()
        };
        let err = ledger.update(&l2.id, &patch).await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateBatch { ref batch } if batch == "L1"));

        // Both rows unchanged.
        let counts = ledger.list_for_product("A-100").await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].batch, "L1");
        assert_eq!(counts[0].quantity, 10);
        assert_eq!(counts[1].batch, "L2");
        assert_eq!(counts[1].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_rejected() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        let (count, _) = ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();

        let err = ledger
            .update(&count.id, &CountPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Row untouched.
        let stored = ledger.get_by_id(&count.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 10);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let db = test_db().await;

        let patch = CountPatch {
            quantity: Some(1),
            ..Default::default()
        };
        let err = db
            .counts()
            .update("550e8400-e29b-41d4-a716-446655440000", &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_count() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        let (count, _) = ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();
        ledger.delete(&count.id).await.unwrap();

        assert!(ledger.get_by_id(&count.id).await.unwrap().is_none());
        assert!(matches!(
            ledger.delete(&count.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_counts() {
        let db = test_db().await;
        let product = db.products().register("A-100", "Widget").await.unwrap();
        let ledger = db.counts();

        ledger.submit("A-100", "L1", 3, 2025, 10).await.unwrap();
        ledger.submit("A-100", "L2", 4, 2025, 5).await.unwrap();

        db.products().delete(&product.id).await.unwrap();

        // Product gone, counts gone with it.
        let err = ledger.list_for_product("A-100").await.unwrap_err();
        assert!(matches!(err, DbError::ProductNotFound { .. }));
        assert!(ledger.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_joins_product_details() {
        let db = test_db().await;
        db.products().register("A-100", "Widget").await.unwrap();
        db.counts().submit("A-100", "L1", 3, 2025, 10).await.unwrap();

        let entries = db.counts().list_all().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_code, "A-100");
        assert_eq!(entries[0].product_name, "Widget");
        assert_eq!(entries[0].quantity, 10);
    }
}
