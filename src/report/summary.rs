use std::ops::AddAssign;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{InvoiceDirection, InvoiceRecord, PeriodKey, RecordId};

/// Counts and sums carried by every summary node.
///
/// A parent's totals are always the sum of its children's totals. Sums
/// saturate at the bounds of [`Decimal`] instead of overflowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Number of records.
    pub count: usize,
    /// Sum of net amounts (missing amounts count as zero).
    pub sum_excl_vat: Decimal,
    /// Sum of VAT amounts (missing amounts count as zero).
    pub sum_vat: Decimal,
    /// Number of records with at least one validation issue.
    pub flagged_count: usize,
}

impl SummaryTotals {
    pub(crate) fn add_record(&mut self, record: &InvoiceRecord, flagged: bool) {
        self.count += 1;
        self.sum_excl_vat = self.sum_excl_vat.saturating_add(record.amount_or_zero());
        self.sum_vat = self.sum_vat.saturating_add(record.vat_or_zero());
        if flagged {
            self.flagged_count += 1;
        }
    }

    /// Gross amount (net + VAT).
    pub fn sum_gross(&self) -> Decimal {
        self.sum_excl_vat.saturating_add(self.sum_vat)
    }

    pub(crate) fn rolled_up<'a>(children: impl IntoIterator<Item = &'a SummaryTotals>) -> Self {
        let mut totals = Self::default();
        for child in children {
            totals += child;
        }
        totals
    }
}

impl AddAssign<&SummaryTotals> for SummaryTotals {
    fn add_assign(&mut self, rhs: &SummaryTotals) {
        self.count += rhs.count;
        self.sum_excl_vat = self.sum_excl_vat.saturating_add(rhs.sum_excl_vat);
        self.sum_vat = self.sum_vat.saturating_add(rhs.sum_vat);
        self.flagged_count += rhs.flagged_count;
    }
}

/// Leaf node: one counterpart within a month and direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    /// Company name, or the configured label for records without one.
    pub company: String,
    pub totals: SummaryTotals,
    /// Records backing this node, in snapshot order.
    pub record_ids: Vec<RecordId>,
}

/// All companies of one direction within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub direction: InvoiceDirection,
    pub totals: SummaryTotals,
    /// Companies in presentation order.
    pub companies: Vec<CompanySummary>,
}

impl DirectionSummary {
    pub fn company(&self, name: &str) -> Option<&CompanySummary> {
        self.companies.iter().find(|c| c.company == name)
    }
}

/// One calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub period: PeriodKey,
    pub totals: SummaryTotals,
    /// Sales first, then purchases.
    pub directions: Vec<DirectionSummary>,
}

impl MonthSummary {
    pub fn direction(&self, direction: InvoiceDirection) -> Option<&DirectionSummary> {
        self.directions.iter().find(|d| d.direction == direction)
    }
}

/// Year → month → direction → company summary tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub year: i32,
    pub totals: SummaryTotals,
    /// Most recent month first.
    pub months: Vec<MonthSummary>,
}

impl PeriodSummary {
    pub fn month(&self, period: PeriodKey) -> Option<&MonthSummary> {
        self.months.iter().find(|m| m.period == period)
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}
