//! One entry point for the UI and export layers.

use chrono::{Local, NaiveDate};

use crate::config::EngineConfig;
use crate::core::{InvoiceRecord, InvoiceValidator, IssueMap};
#[cfg(feature = "dedup")]
use crate::core::PeriodKey;
#[cfg(feature = "dedup")]
use crate::dedup::{DuplicateGroup, DuplicateResolver};
#[cfg(feature = "report")]
use crate::report::{PeriodAggregator, PeriodSummary};

/// Runs validation, aggregation, and duplicate detection over caller-supplied
/// snapshots.
///
/// Every call recomputes from the snapshot it is given; nothing is cached
/// between calls.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    today: NaiveDate,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            today: Local::now().date_naive(),
        }
    }

    /// Pin "today" for date checks, two-digit years and year fallbacks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn validator(&self) -> InvoiceValidator {
        InvoiceValidator::new(self.config.validation.clone()).with_today(self.today)
    }

    /// Issues for every record in the snapshot.
    pub fn validate_all(&self, records: &[InvoiceRecord]) -> IssueMap {
        self.validator().validate_all(records)
    }

    #[cfg(feature = "report")]
    pub fn aggregator<'a>(&self, records: &'a [InvoiceRecord]) -> PeriodAggregator<'a> {
        PeriodAggregator::new(records)
            .with_config(self.config.report.clone())
            .with_today(self.today)
    }

    /// Validate the snapshot and summarize `year`.
    #[cfg(feature = "report")]
    pub fn summarize(&self, records: &[InvoiceRecord], year: i32) -> PeriodSummary {
        let issues = self.validate_all(records);
        self.summarize_with(records, year, &issues)
    }

    /// Summarize `year` using an issue map the caller already holds.
    #[cfg(feature = "report")]
    pub fn summarize_with(
        &self,
        records: &[InvoiceRecord],
        year: i32,
        issues: &IssueMap,
    ) -> PeriodSummary {
        self.aggregator(records).summarize(year, issues)
    }

    /// Years to offer for selection, most recent first.
    #[cfg(feature = "report")]
    pub fn available_years(&self, records: &[InvoiceRecord]) -> Vec<i32> {
        self.aggregator(records).available_years()
    }

    #[cfg(feature = "dedup")]
    pub fn resolver(&self) -> DuplicateResolver {
        DuplicateResolver::new(self.today)
    }

    /// Duplicate groups within `period`.
    #[cfg(feature = "dedup")]
    pub fn find_duplicates<'a>(
        &self,
        records: &'a [InvoiceRecord],
        period: PeriodKey,
    ) -> Vec<DuplicateGroup<'a>> {
        self.resolver().find_duplicates_in_period(records, period)
    }
}
