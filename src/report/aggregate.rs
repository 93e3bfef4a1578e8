use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;

use super::summary::*;
use super::{CompanyOrder, ReportConfig};
use crate::core::{DateNormalizer, InvoiceDirection, InvoiceRecord, IssueMap, PeriodKey};

type CompanyBuckets<'r> = BTreeMap<String, Vec<&'r InvoiceRecord>>;
type Buckets<'r> = BTreeMap<PeriodKey, BTreeMap<InvoiceDirection, CompanyBuckets<'r>>>;

/// Buckets a snapshot by month, direction and company.
///
/// Records whose date cannot be normalized belong to no period: they appear
/// in no bucket and in no total.
#[derive(Debug, Clone)]
pub struct PeriodAggregator<'a> {
    records: &'a [InvoiceRecord],
    config: ReportConfig,
    today: NaiveDate,
    normalizer: DateNormalizer,
}

impl<'a> PeriodAggregator<'a> {
    pub fn new(records: &'a [InvoiceRecord]) -> Self {
        let today = Local::now().date_naive();
        Self {
            records,
            config: ReportConfig::default(),
            today,
            normalizer: DateNormalizer::new(today),
        }
    }

    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    /// Pin "today" for two-digit year expansion and the year fallback.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self.normalizer = DateNormalizer::new(today);
        self
    }

    /// Build the summary tree for `year`.
    ///
    /// `issues` decides which records count as flagged; records absent from
    /// the map are treated as clean.
    pub fn summarize(&self, year: i32, issues: &IssueMap) -> PeriodSummary {
        let mut buckets: Buckets<'_> = BTreeMap::new();

        let mut included = 0usize;
        for (period, record) in self.dated_records() {
            if period.year != year {
                continue;
            }
            included += 1;
            buckets
                .entry(period)
                .or_default()
                .entry(record.direction())
                .or_default()
                .entry(self.company_label(record).to_string())
                .or_default()
                .push(record);
        }

        let months: Vec<MonthSummary> = buckets
            .into_iter()
            .rev()
            .map(|(period, directions)| {
                let mut directions: Vec<DirectionSummary> = directions
                    .into_iter()
                    .map(|(direction, companies)| {
                        self.direction_summary(direction, companies, issues)
                    })
                    .collect();
                directions.sort_by(|a, b| b.direction.code().cmp(a.direction.code()));
                MonthSummary {
                    period,
                    totals: SummaryTotals::rolled_up(directions.iter().map(|d| &d.totals)),
                    directions,
                }
            })
            .collect();

        debug!(
            year,
            months = months.len(),
            records = included,
            "summarized invoice period"
        );

        PeriodSummary {
            year,
            totals: SummaryTotals::rolled_up(months.iter().map(|m| &m.totals)),
            months,
        }
    }

    /// Records dated within `period`, in snapshot order.
    pub fn records_for_month(&self, period: PeriodKey) -> Vec<&'a InvoiceRecord> {
        self.dated_records()
            .filter(|(p, _)| *p == period)
            .map(|(_, record)| record)
            .collect()
    }

    /// Records backing one leaf of the summary tree.
    ///
    /// `company` is matched against the same label the summary uses, so the
    /// unknown-company label selects records without a company name.
    pub fn records_for(
        &self,
        period: PeriodKey,
        direction: InvoiceDirection,
        company: &str,
    ) -> Vec<&'a InvoiceRecord> {
        self.dated_records()
            .filter(|(p, record)| {
                *p == period
                    && record.direction() == direction
                    && self.company_label(record) == company
            })
            .map(|(_, record)| record)
            .collect()
    }

    /// Years with at least one readable date, most recent first. Falls back
    /// to the current year when no date parses.
    pub fn available_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.dated_records().map(|(p, _)| p.year).collect();
        if years.is_empty() {
            return vec![self.today.year()];
        }
        years.into_iter().rev().collect()
    }

    fn dated_records(&self) -> impl Iterator<Item = (PeriodKey, &'a InvoiceRecord)> + '_ {
        self.records
            .iter()
            .filter_map(|record| record.period(&self.normalizer).map(|p| (p, record)))
    }

    fn company_label<'r>(&'r self, record: &'r InvoiceRecord) -> &'r str {
        record
            .company()
            .unwrap_or(self.config.unknown_company_label.as_str())
    }

    fn direction_summary(
        &self,
        direction: InvoiceDirection,
        companies: CompanyBuckets<'_>,
        issues: &IssueMap,
    ) -> DirectionSummary {
        let mut companies: Vec<CompanySummary> = companies
            .into_iter()
            .map(|(company, records)| {
                let mut totals = SummaryTotals::default();
                for record in &records {
                    let flagged = issues.get(&record.id).is_some_and(|list| !list.is_empty());
                    totals.add_record(record, flagged);
                }
                CompanySummary {
                    company,
                    totals,
                    record_ids: records.iter().map(|r| r.id).collect(),
                }
            })
            .collect();
        let order = self.config.company_order;
        companies.sort_by(|a, b| compare_companies(order, &a.company, &b.company));

        DirectionSummary {
            direction,
            totals: SummaryTotals::rolled_up(companies.iter().map(|c| &c.totals)),
            companies,
        }
    }
}

fn compare_companies(order: CompanyOrder, a: &str, b: &str) -> Ordering {
    match order {
        CompanyOrder::CaseSensitive => a.cmp(b),
        CompanyOrder::CaseInsensitive => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
    }
}
