//! Duplicate invoice detection and resolution.
//!
//! Records are duplicates when they share a non-blank invoice number within
//! one period. For each group the most recent record survives and the rest
//! are returned as losers. Deleting them is the caller's job; [`delete_losers`]
//! applies a batch of resolutions to an [`InvoiceStore`](crate::store::InvoiceStore)
//! and reports every deletion individually.
//!
//! # Example
//!
//! ```ignore
//! use belegpruefer::dedup::*;
//!
//! let resolver = DuplicateResolver::default();
//! let groups = resolver.find_duplicates_in_period(&records, "2025-01".parse()?);
//! let resolutions = resolver.resolve_all(&groups);
//! let report = delete_losers(&resolutions, &mut store);
//! println!("{} of {} deletions succeeded", report.succeeded(), report.attempted());
//! ```

mod apply;
mod groups;

pub use apply::{DeletionOutcome, DeletionReport, delete_losers};
pub use groups::{DuplicateGroup, DuplicateResolver, Resolution};
