use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::core::{DateNormalizer, InvoiceRecord, PeriodKey, RecordId};

/// Records sharing one non-blank invoice number. Always holds at least two records.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup<'a> {
    external_invoice_id: String,
    records: Vec<&'a InvoiceRecord>,
}

impl<'a> DuplicateGroup<'a> {
    pub fn external_invoice_id(&self) -> &str {
        &self.external_invoice_id
    }

    /// Members in snapshot order.
    pub fn records(&self) -> &[&'a InvoiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of resolving one group: the record to keep and those to delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub external_invoice_id: String,
    pub survivor: &'a InvoiceRecord,
    /// Most recent first.
    pub losers: Vec<&'a InvoiceRecord>,
}

impl Resolution<'_> {
    pub fn loser_ids(&self) -> Vec<RecordId> {
        self.losers.iter().map(|r| r.id).collect()
    }
}

/// Finds records referring to the same external invoice and picks a survivor.
///
/// Groups are computed from the snapshot on every call and never cached;
/// after deletions are applied the caller reloads and detects again.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateResolver {
    normalizer: DateNormalizer,
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl DuplicateResolver {
    /// `today` anchors two-digit year expansion in the recency key.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            normalizer: DateNormalizer::new(today),
        }
    }

    /// Group records by invoice number. The caller has already scoped
    /// `records` to one period. Groups come back ordered by invoice number.
    pub fn find_duplicates<'a>(&self, records: &'a [InvoiceRecord]) -> Vec<DuplicateGroup<'a>> {
        group_by_external_id(records.iter())
    }

    /// Group the records of `period` by invoice number. Records without a
    /// readable date belong to no period and are never grouped.
    pub fn find_duplicates_in_period<'a>(
        &self,
        records: &'a [InvoiceRecord],
        period: PeriodKey,
    ) -> Vec<DuplicateGroup<'a>> {
        let groups = group_by_external_id(
            records
                .iter()
                .filter(|r| r.period(&self.normalizer) == Some(period)),
        );
        debug!(%period, groups = groups.len(), "detected duplicate invoice numbers");
        groups
    }

    /// Keep the most recent record; ties go to the higher storage id.
    ///
    /// Returns `None` only for an empty group, which detection never yields.
    pub fn resolve<'a>(&self, group: &DuplicateGroup<'a>) -> Option<Resolution<'a>> {
        let mut ordered = group.records.clone();
        ordered.sort_by_cached_key(|r| Reverse((self.recency_key(r), r.id)));

        let mut ordered = ordered.into_iter();
        let survivor = ordered.next()?;
        Some(Resolution {
            external_invoice_id: group.external_invoice_id.clone(),
            survivor,
            losers: ordered.collect(),
        })
    }

    /// Resolve each group independently.
    pub fn resolve_all<'a>(&self, groups: &[DuplicateGroup<'a>]) -> Vec<Resolution<'a>> {
        groups.iter().filter_map(|group| self.resolve(group)).collect()
    }

    /// The recency key a record sorts by: `yyyymmdd` of its date, `0` if
    /// unreadable. See [`DateNormalizer::recency_key`].
    pub fn recency_key(&self, record: &InvoiceRecord) -> i64 {
        self.normalizer.recency_key(record.date.as_deref())
    }
}

fn group_by_external_id<'a>(
    records: impl Iterator<Item = &'a InvoiceRecord>,
) -> Vec<DuplicateGroup<'a>> {
    let mut by_id: BTreeMap<&'a str, Vec<&'a InvoiceRecord>> = BTreeMap::new();
    for record in records {
        if let Some(external_id) = record.external_id() {
            by_id.entry(external_id).or_default().push(record);
        }
    }
    by_id
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(external_invoice_id, records)| DuplicateGroup {
            external_invoice_id: external_invoice_id.to_string(),
            records,
        })
        .collect()
}
