//! Detect duplicate invoice numbers in one month, keep the most recent
//! record of each group and delete the rest from an in-memory store.
//!
//! Run with: `cargo run --example resolve_duplicates`

use belegpruefer::core::*;
use belegpruefer::dedup::{DuplicateResolver, delete_losers};
use belegpruefer::store::{InvoiceStore, MemoryStore};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn record(id: i64, external_id: &str, date: &str) -> InvoiceRecord {
    InvoiceRecordBuilder::new(id)
        .external_id(external_id)
        .date(date)
        .company("UAB Baltic Parts")
        .amounts(dec!(100.00), dec!(21.00))
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut store = MemoryStore::new(vec![
        record(1, "INV-1", "2025-01-01"),
        record(2, "INV-1", "15.01.2025"),
        record(3, "INV-2", "2025-01-03"),
        record(4, "INV-2", "20250103"),
        record(5, "INV-2", "unreadable"),
        record(6, "INV-3", "2025-01-09"),
    ]);
    // Pretend the bookkeeping system refuses to delete record 3.
    store.lock(RecordId(3));

    let period: PeriodKey = "2025-01".parse()?;
    let resolver = DuplicateResolver::default();
    let snapshot = store.fetch_all()?;

    let groups = resolver.find_duplicates_in_period(&snapshot, period);
    println!("{} duplicate group(s) in {period}", groups.len());
    let resolutions = resolver.resolve_all(&groups);
    for resolution in &resolutions {
        println!(
            "  {}: keep {}, delete {:?}",
            resolution.external_invoice_id,
            resolution.survivor.id,
            resolution.loser_ids()
        );
    }

    let report = delete_losers(&resolutions, &mut store);
    println!("Deleted {} of {} record(s)", report.succeeded(), report.attempted());
    for failure in report.failures() {
        println!(
            "  {} ({}): {}",
            failure.record,
            failure.external_invoice_id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    let remaining = store.fetch_all()?;
    let left = resolver.find_duplicates_in_period(&remaining, period);
    println!("{} record(s) remain, {} group(s) still open", remaining.len(), left.len());
    Ok(())
}
