#![cfg(all(feature = "dedup", feature = "json"))]

use belegpruefer::core::*;
use belegpruefer::dedup::*;
use belegpruefer::store::{InvoiceStore, MemoryStore, StoreError};
use belegpruefer::Engine;
use chrono::NaiveDate;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn record(id: i64, external_id: &str, date: &str) -> InvoiceRecord {
    InvoiceRecordBuilder::new(id)
        .external_id(external_id)
        .date(date)
        .company("UAB Alfa")
        .build()
}

const SNAPSHOT: &str = r#"[
    {"id": 1, "external_invoice_id": "INV-1", "date": "2025-01-01", "company_name": "UAB Alfa",
     "amount_excl_vat": "100.00", "vat_amount": "21.00", "invoice_direction": "P"},
    {"id": 2, "external_invoice_id": "INV-1", "date": "15.01.2025", "company_name": "UAB Alfa",
     "amount_excl_vat": "100.00", "vat_amount": "21.00"},
    {"id": 3, "external_invoice_id": "INV-2", "date": "2025-01-03", "company_name": "UAB Beta",
     "amount_excl_vat": "50", "vat_amount": "10.50", "invoice_direction": "S"},
    {"id": 4, "external_invoice_id": "INV-2", "date": "2025-02-03", "company_name": "UAB Beta"},
    {"id": 5, "external_invoice_id": "INV-3", "date": "2025-01-09"},
    {"id": 6, "date": "2025-01-09"},
    {"id": 7, "external_invoice_id": "  ", "date": "2025-01-09"}
]"#;

#[test]
fn most_recent_of_mixed_shapes_survives() {
    let records = vec![record(1, "INV-1", "2025-01-01"), record(2, "INV-1", "2025-01-15")];
    let resolver = DuplicateResolver::new(today());
    let resolutions = resolver.resolve_all(&resolver.find_duplicates(&records));
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].survivor.id, RecordId(2));
    assert_eq!(resolutions[0].loser_ids(), vec![RecordId(1)]);
}

#[test]
fn groups_are_scoped_to_one_period() {
    let store = MemoryStore::from_json_str(SNAPSHOT).unwrap();
    let records = store.fetch_all().unwrap();
    let engine = Engine::default().with_today(today());

    let january = engine.find_duplicates(&records, "2025-01".parse().unwrap());
    let ids: Vec<&str> = january.iter().map(|g| g.external_invoice_id()).collect();
    assert_eq!(ids, vec!["INV-1"]);

    let february = engine.find_duplicates(&records, "2025-02".parse().unwrap());
    assert!(february.is_empty());

    // Without a period scope INV-2 spans two months and forms a group.
    let unscoped = engine.resolver().find_duplicates(&records);
    assert_eq!(unscoped.len(), 2);
}

#[test]
fn delete_then_detect_again() {
    let mut store = MemoryStore::from_json_str(SNAPSHOT).unwrap();
    let engine = Engine::default().with_today(today());
    let january: PeriodKey = "2025-01".parse().unwrap();

    let snapshot = store.fetch_all().unwrap();
    let groups = engine.find_duplicates(&snapshot, january);
    let resolutions = engine.resolver().resolve_all(&groups);
    let report = delete_losers(&resolutions, &mut store);
    assert!(report.is_complete());
    assert_eq!(report.attempted(), 1);
    assert_eq!(report.outcomes[0].record, RecordId(1));
    assert_eq!(report.outcomes[0].survivor, RecordId(2));

    let reloaded = store.fetch_all().unwrap();
    assert_eq!(reloaded.len(), 6);
    assert!(engine.find_duplicates(&reloaded, january).is_empty());
}

#[test]
fn failed_deletions_are_reported_per_record() {
    let records = vec![
        record(1, "A", "2025-03-01"),
        record(2, "A", "2025-03-02"),
        record(3, "B", "2025-03-01"),
        record(4, "B", "2025-03-05"),
    ];
    let mut store = MemoryStore::new(records.clone());
    store.lock(RecordId(1));
    // Record 3 disappears before the run, as if deleted concurrently.
    store.delete(&records[2]).unwrap();

    let resolver = DuplicateResolver::new(today());
    let resolutions = resolver.resolve_all(&resolver.find_duplicates(&records));
    let report = delete_losers(&resolutions, &mut store);

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.failed(), 2);
    let errors: Vec<(RecordId, Option<String>)> = report
        .failures()
        .map(|o| (o.record, o.error.clone()))
        .collect();
    assert_eq!(
        errors,
        vec![
            (RecordId(1), Some(StoreError::Locked(RecordId(1)).to_string())),
            (RecordId(3), Some(StoreError::NotFound(RecordId(3)).to_string())),
        ]
    );
}

#[test]
fn deletion_report_serializes() {
    let records = vec![record(1, "A", "2025-03-01"), record(2, "A", "2025-03-02")];
    let mut store = MemoryStore::new(records.clone());
    let resolver = DuplicateResolver::new(today());
    let resolutions = resolver.resolve_all(&resolver.find_duplicates(&records));
    let report = delete_losers(&resolutions, &mut store);

    insta::assert_snapshot!(serde_json::to_string(&report).unwrap(), @r#"{"outcomes":[{"external_invoice_id":"A","survivor":2,"record":1,"error":null}]}"#);
}

#[test]
fn recency_key_values() {
    let resolver = DuplicateResolver::new(today());
    assert_eq!(resolver.recency_key(&record(1, "A", "15.01.2025")), 20250115);
    assert_eq!(resolver.recency_key(&record(1, "A", "n/a")), 0);
    assert_eq!(resolver.recency_key(&record(1, "A", "2024344")), 0);
    assert_eq!(resolver.recency_key(&InvoiceRecord::empty(1)), 0);
}
