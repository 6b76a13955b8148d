//! # Repository Module
//!
//! Repository implementations for the stocktake storage layer.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Adapter (transport / import / export)                                 │
//! │       │                                                                 │
//! │       │  db.counts().submit("A-100", "L1", 6, 2026, 10)                │
//! │       ▼                                                                 │
//! │  CountRepository                                                       │
//! │  ├── submit(...)     one transaction, merge-or-insert                  │
//! │  ├── update(...)                                                       │
//! │  └── list_all(...)                                                     │
//! │       │                                                                 │
//! │       │  SQL                                                           │
//! │       ▼                                                                 │
//! │  SQLite (unique indexes as the authoritative duplicate backstop)       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Transaction boundaries are explicit per operation                   │
//! │  • Can swap storage implementations behind the same surface            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product Registry (register, rename, delete)
//! - [`count::CountRepository`] - Count Ledger (submit/merge, update, joins)
//! - [`report::ReportRepository`] - Reporting Engine (summary, full ledger)

pub mod count;
pub mod product;
pub mod report;
