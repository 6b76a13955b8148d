//! # stocktake-core: Pure Business Logic for Stocktake
//!
//! This crate is the **heart** of the stocktake system. It contains the
//! domain types and business rules for batch-level inventory counting as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stocktake Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │      Adapters (HTTP transport, import, PDF/XLSX export)         │   │
//! │  │                     (out of scope, external)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                stocktake-db (Database Layer)                    │   │
//! │  │        Registry, Ledger and Reporting repositories              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stocktake-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  report   │  │ validation│  │   error   │  │   │
//! │  │   │  Product  │  │ FullLedger│  │   rules   │  │ Validation│  │   │
//! │  │   │ StockCount│  │  Summary  │  │  checks   │  │   Error   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockCount, report rows)
//! - [`validation`] - Business rule validation
//! - [`report`] - Deterministic report assembly
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stocktake_core::Product` instead of
// `use stocktake_core::types::Product`

pub use error::{ValidationError, ValidationResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product code.
///
/// Codes are assigned externally (not generated) and act as the business
/// identifier, so they stay short.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of a product display name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a batch identifier.
pub const MAX_BATCH_LEN: usize = 100;

/// Expiry years must be 4-digit calendar years.
pub const MIN_EXPIRY_YEAR: i64 = 1000;
pub const MAX_EXPIRY_YEAR: i64 = 9999;
