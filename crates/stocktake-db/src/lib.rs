//! # stocktake-db: Storage Layer for Stocktake
//!
//! This crate provides database access for the stocktake system.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stocktake Data Flow                               │
//! │                                                                         │
//! │  Adapter call (submit count, register product, build report)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stocktake-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CountRepo     │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FK on   │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (products, counts)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - Registry, Ledger and Reporting repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stocktake_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stocktake.db")).await?;
//!
//! db.products().register("A-100", "Widget").await?;
//! let (count, outcome) = db.counts().submit("A-100", "L1", 6, 2026, 10).await?;
//! let report = db.reports().summarize().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::count::CountRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
