//! # Database Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classifies constraint violations              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository ← Enriches raw UniqueViolation into DuplicateCode /        │
//! │       │        DuplicateBatch with the colliding key                    │
//! │       ▼                                                                 │
//! │  Transport adapter (out of scope) maps each variant to a status class  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business outcomes (`DuplicateCode`, `DuplicateBatch`, `ProductNotFound`,
//! `NotFound`, `Validation`) are distinct from storage faults
//! (`ConnectionFailed`, `QueryFailed`, ...); `Integrity` stands alone as a
//! fatal bug signal, never a normal user-facing error.

use stocktake_core::ValidationError;
use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Malformed or missing input. Raised before any write happens, so a
    /// validation failure never leaves a partial mutation behind.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Entity not found by id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A product referenced by business code does not exist.
    ///
    /// Distinct from [`DbError::NotFound`] because it names the dependency
    /// a ledger operation failed to resolve.
    #[error("Product not found: {code}")]
    ProductNotFound { code: String },

    /// Another product already owns this code.
    #[error("Product code '{code}' already exists")]
    DuplicateCode { code: String },

    /// Another count of the same product already owns this batch.
    #[error("Batch '{batch}' already exists for this product")]
    DuplicateBatch { batch: String },

    /// Unique constraint violation not yet attributed to a business key.
    ///
    /// Repositories translate this into `DuplicateCode`/`DuplicateBatch`
    /// at the call site, where the colliding value is known.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Referential-integrity fault: a count whose product reference
    /// resolves to nothing. This is a bug signal, not a user error.
    #[error("Referential integrity violation: {message}")]
    Integrity { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an Integrity error.
    pub fn integrity(message: impl Into<String>) -> Self {
        DbError::Integrity {
            message: message.into(),
        }
    }

    /// True for business-rule outcomes a caller can act on; false for
    /// storage faults and integrity violations.
    pub fn is_business_error(&self) -> bool {
        matches!(
            self,
            DbError::Validation(_)
                | DbError::NotFound { .. }
                | DbError::ProductNotFound { .. }
                | DbError::DuplicateCode { .. }
                | DbError::DuplicateBatch { .. }
                | DbError::UniqueViolation { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
