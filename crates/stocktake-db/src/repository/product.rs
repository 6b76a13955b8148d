//! # Product Repository (Product Registry)
//!
//! Owns the set of known products and enforces code uniqueness.
//!
//! ## Duplicate Detection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             register("A-100", "Widget")  [one transaction]              │
//! │                                                                         │
//! │  1. validate + trim inputs                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. optimistic pre-check: SELECT ... WHERE code = 'A-100'              │
//! │       │        found? → DuplicateCode (fast, friendly path)            │
//! │       ▼                                                                 │
//! │  3. INSERT INTO products ...                                           │
//! │       │        UNIQUE constraint fired? → DuplicateCode                │
//! │       ▼          (authoritative backstop - the pre-check is racy)      │
//! │  4. COMMIT → Ok(Product)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Like the ledger, every read-check-then-write here runs inside a single
//! transaction: `rename` re-reads the row and writes it back without
//! another writer interleaving, so a concurrent partial rename can never
//! revert a committed change from a stale snapshot.
//!
//! The import adapter treats `DuplicateCode` as "skip and report", not as a
//! hard failure; registration is idempotent-by-code from its point of view.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocktake_core::validation::{validate_product_code, validate_product_name, validate_uuid};
use stocktake_core::Product;

/// Repository for product registry operations.
///
/// ## Usage
/// ```rust,ignore
/// let registry = db.products();
///
/// let product = registry.register("A-100", "Widget").await?;
/// let found = registry.lookup("A-100").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, code, name, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Registers a new product.
    ///
    /// Inputs are trimmed before validation and persistence; uniqueness is
    /// judged on the trimmed code.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Registered product with generated id
    /// * `Err(DbError::Validation)` - Empty or over-long code/name
    /// * `Err(DbError::DuplicateCode)` - Code already registered
    pub async fn register(&self, code: &str, name: &str) -> DbResult<Product> {
        let code = validate_product_code(code)?;
        let name = validate_product_name(name)?;

        debug!(code = %code, "Registering product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code,
            name,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        // Friendly pre-check; the unique index settles concurrent races.
        let existing = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(&product.code)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(DbError::DuplicateCode { code: product.code });
        }

        sqlx::query(
            r#"
            INSERT INTO products (id, code, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::DuplicateCode {
                code: product.code.clone(),
            },
            other => other,
        })?;

        tx.commit().await?;

        Ok(product)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Looks up a product by code, failing if it doesn't exist.
    ///
    /// The existence-check entry point for the import adapter.
    pub async fn lookup(&self, code: &str) -> DbResult<Product> {
        let code = validate_product_code(code)?;

        self.get_by_code(&code)
            .await?
            .ok_or(DbError::ProductNotFound { code })
    }

    /// Lists all registered products.
    ///
    /// Ordering is NOT part of the contract - callers that need an order
    /// sort for themselves (the reporting engine imposes its own).
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products"))
                .fetch_all(&self.pool)
                .await?;

        Ok(products)
    }

    /// Renames a product: partial update of code and/or name.
    ///
    /// Only supplied fields change. A changed code is re-validated for
    /// uniqueness, with the unique index as the commit-time backstop.
    ///
    /// Read and write happen in one transaction, so the unchanged fields
    /// written back always come from the row as it stood inside this
    /// operation - a concurrent rename cannot be reverted from a stale
    /// pre-read snapshot.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - No product with this id
    /// * `Err(DbError::DuplicateCode)` - New code collides
    pub async fn rename(
        &self,
        id: &str,
        new_code: Option<&str>,
        new_name: Option<&str>,
    ) -> DbResult<Product> {
        validate_uuid(id)?;

        let mut tx = self.pool.begin().await?;

        let mut product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        if let Some(code) = new_code {
            let code = validate_product_code(code)?;
            if code != product.code {
                let collision = sqlx::query_as::<_, Product>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
                ))
                .bind(&code)
                .fetch_optional(&mut *tx)
                .await?;

                if collision.is_some() {
                    return Err(DbError::DuplicateCode { code });
                }
            }
            product.code = code;
        }

        if let Some(name) = new_name {
            product.name = validate_product_name(name)?;
        }

        product.updated_at = Utc::now();

        debug!(id = %product.id, code = %product.code, "Renaming product");

        sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::DuplicateCode {
                code: product.code.clone(),
            },
            other => other,
        })?;

        tx.commit().await?;

        Ok(product)
    }

    /// Deletes a product and, via `ON DELETE CASCADE`, every count it owns.
    ///
    /// A single statement, so product and counts disappear atomically.
    ///
    /// ## Returns
    /// * `Ok(())` - Deleted
    /// * `Err(DbError::NotFound)` - No product with this id
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        validate_uuid(id)?;

        debug!(id = %id, "Deleting product (cascades to counts)");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts registered products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
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
    async fn test_register_trims_inputs() {
        let db = test_db().await;
        let product = db.products().register("  A-100 ", "  Widget ").await.unwrap();

        assert_eq!(product.code, "A-100");
        assert_eq!(product.name, "Widget");
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let db = test_db().await;

        assert!(matches!(
            db.products().register("   ", "Widget").await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            db.products().register("A-100", "").await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected_and_original_untouched() {
        let db = test_db().await;
        let registry = db.products();

        registry.register("A-100", "Widget").await.unwrap();

        let err = registry.register("A-100", "Other Name").await.unwrap_err();
        assert!(matches!(err, DbError::DuplicateCode { ref code } if code == "A-100"));

        // The existing product is unaltered.
        let original = registry.lookup("A-100").await.unwrap();
        assert_eq!(original.name, "Widget");
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_unknown_code() {
        let db = test_db().await;

        let err = db.products().lookup("NOPE").await.unwrap_err();
        assert!(matches!(err, DbError::ProductNotFound { ref code } if code == "NOPE"));
    }

    #[tokio::test]
    async fn test_rename_partial_update() {
        let db = test_db().await;
        let registry = db.products();

        let product = registry.register("A-100", "Widget").await.unwrap();

        // Only the name changes; code stays.
        let renamed = registry
            .rename(&product.id, None, Some("Widget Mk2"))
            .await
            .unwrap();
        assert_eq!(renamed.code, "A-100");
        assert_eq!(renamed.name, "Widget Mk2");

        // Code changes too, re-validated for uniqueness.
        let renamed = registry
            .rename(&product.id, Some("A-200"), None)
            .await
            .unwrap();
        assert_eq!(renamed.code, "A-200");
        assert!(registry.get_by_code("A-100").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sequential_partial_renames_both_persist() {
        let db = test_db().await;
        let registry = db.products();

        let product = registry.register("A-100", "Widget").await.unwrap();

        // Each rename writes back the row as it stood inside its own
        // transaction, so neither change can be lost to a stale snapshot.
        registry
            .rename(&product.id, Some("A-200"), None)
            .await
            .unwrap();
        registry
            .rename(&product.id, None, Some("Widget Mk2"))
            .await
            .unwrap();

        let stored = registry.lookup("A-200").await.unwrap();
        assert_eq!(stored.code, "A-200");
        assert_eq!(stored.name, "Widget Mk2");
    }

    #[tokio::test]
    async fn test_rename_to_colliding_code() {
        let db = test_db().await;
        let registry = db.products();

        registry.register("A-100", "Widget").await.unwrap();
        let other = registry.register("B-200", "Bolt").await.unwrap();

        let err = registry
            .rename(&other.id, Some("A-100"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateCode { .. }));

        // Renaming to its own code is not a collision.
        let same = registry
            .rename(&other.id, Some("B-200"), Some("Bolt XL"))
            .await
            .unwrap();
        assert_eq!(same.name, "Bolt XL");
    }

    #[tokio::test]
    async fn test_rename_unknown_id() {
        let db = test_db().await;

        let err = db
            .products()
            .rename("550e8400-e29b-41d4-a716-446655440000", None, Some("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let db = test_db().await;

        let err = db
            .products()
            .delete("550e8400-e29b-41d4-a716-446655440000")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_returns_everything() {
        let db = test_db().await;
        let registry = db.products();

        registry.register("B", "Bolt").await.unwrap();
        registry.register("A", "Anchor").await.unwrap();

        let all = registry.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
