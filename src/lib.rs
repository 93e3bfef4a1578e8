//! # belegpruefer
//!
//! Consistency engine for invoice records extracted by OCR or manual entry.
//! Decides which records are trustworthy, summarizes them per period, and
//! eliminates duplicates without relying on a rigid input schema.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! The engine operates on snapshots supplied by the caller and never owns
//! storage: it returns issue maps, summaries, and deletion decisions that the
//! caller applies to its store of record.
//!
//! ## Quick Start
//!
//! ```rust
//! use belegpruefer::core::*;
//! use rust_decimal_macros::dec;
//!
//! let records = vec![
//!     InvoiceRecordBuilder::new(1)
//!         .external_id("INV-1")
//!         .date("15.01.2025")
//!         .company("UAB Baltic Parts")
//!         .amounts(dec!(100.00), dec!(21.04))
//!         .vat_number("LT123456789")
//!         .company_number("304512345")
//!         .build(),
//! ];
//!
//! let issues = validate_all(&records);
//! let kinds: Vec<IssueKind> = issues[&RecordId(1)].iter().map(|i| i.kind).collect();
//! assert_eq!(kinds, vec![IssueKind::VatAmountMismatch]);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Record model, date normalization, validation |
//! | `report` | Period summaries and drill-down |
//! | `dedup` | Duplicate detection and resolution |
//! | `json` | JSON snapshot and configuration loading |
//! | `all` | Everything (default) |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod config;

#[cfg(feature = "core")]
pub mod engine;

#[cfg(feature = "core")]
pub mod store;

#[cfg(feature = "report")]
pub mod report;

#[cfg(feature = "dedup")]
pub mod dedup;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::config::EngineConfig;
#[cfg(feature = "core")]
pub use crate::core::*;
#[cfg(feature = "core")]
pub use crate::engine::Engine;
