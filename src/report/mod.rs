//! Period summaries for reporting and export.
//!
//! Builds a year → month → direction → company tree with counts, sums, and
//! flagged-record counts, plus drill-down accessors returning the records
//! behind any node. Export serializers consume those record lists.
//!
//! # Example
//!
//! ```ignore
//! use belegpruefer::core::*;
//! use belegpruefer::report::*;
//!
//! let issues = InvoiceValidator::default().validate_all(&records);
//! let aggregator = PeriodAggregator::new(&records);
//! let summary = aggregator.summarize(2025, &issues);
//! for month in &summary.months {
//!     println!("{}: {} invoices, {} flagged", month.period, month.totals.count, month.totals.flagged_count);
//! }
//! ```

mod aggregate;
mod summary;

use serde::{Deserialize, Serialize};

pub use aggregate::PeriodAggregator;
pub use summary::{CompanySummary, DirectionSummary, MonthSummary, PeriodSummary, SummaryTotals};

/// Label used for records without a company name.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// How companies are ordered within a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyOrder {
    /// Plain string order: uppercase sorts before lowercase.
    #[default]
    CaseSensitive,
    /// Alphabetical ignoring case.
    CaseInsensitive,
}

/// Presentation options for period summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub company_order: CompanyOrder,
    /// Bucket name for records without a company name.
    pub unknown_company_label: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            company_order: CompanyOrder::default(),
            unknown_company_label: UNKNOWN_COMPANY.into(),
        }
    }
}
