//! Validate and summarize a JSON invoice snapshot.
//!
//! Run with: `cargo run --example audit_snapshot [snapshot.json] [config.json]`
//! Set `RUST_LOG=belegpruefer=debug` to see engine logs.

use belegpruefer::core::*;
use belegpruefer::store::load_snapshot_json;
use belegpruefer::{Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"[
    {"id": 1, "external_invoice_id": "INV-001", "date": "2025-03-04", "company_name": "UAB Baltic Parts",
     "amount_excl_vat": "1000.00", "vat_amount": "210.00", "vat_number": "LT123456789",
     "company_number": "304512345", "invoice_direction": "P"},
    {"id": 2, "external_invoice_id": "INV-002", "date": "04.03.2025", "company_name": "UAB Baltic Parts",
     "amount_excl_vat": "500.00", "vat_amount": "45.00", "vat_number": "LT987654321",
     "company_number": "304512345", "invoice_direction": "P"},
    {"id": 3, "external_invoice_id": "S-17", "date": "Data: 2025 02 28", "company_name": "Nordic Trade AB",
     "amount_excl_vat": "200.00", "vat_amount": "50.00", "vat_number": "123456789",
     "company_number": "556677889", "invoice_direction": "S"},
    {"id": 4, "external_invoice_id": "INV-001", "date": "15/03/25", "company_name": "UAB Baltic Parts",
     "amount_excl_vat": "1000.00", "vat_amount": "210.00", "vat_number": "LT123456789",
     "company_number": "304512345"},
    {"id": 5, "external_invoice_id": "X-9", "date": "sometime", "amount_excl_vat": "-5"}
]"#;

fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let snapshot = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    let config = match args.next() {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let records = load_snapshot_json(&snapshot)?;
    let engine = Engine::new(config);

    let issues = engine.validate_all(&records);
    println!("Validation: {} of {} records flagged", flagged_ids(&issues).len(), records.len());
    for (id, list) in &issues {
        for issue in list {
            println!("  {id} {issue}");
        }
    }
    for (kind, count) in issue_counts(&issues) {
        println!("  {kind}: {count}");
    }

    for year in engine.available_years(&records) {
        let summary = engine.summarize_with(&records, year, &issues);
        println!(
            "\n{year}: {} invoices, net {}, VAT {}, {} flagged",
            summary.totals.count,
            summary.totals.sum_excl_vat,
            summary.totals.sum_vat,
            summary.totals.flagged_count
        );
        for month in &summary.months {
            println!("  {} ({} invoices)", month.period, month.totals.count);
            for direction in &month.directions {
                println!("    {} gross {}", direction.direction, direction.totals.sum_gross());
                for company in &direction.companies {
                    println!(
                        "      {:<24} {:>3} invoices {:>12} net {:>3} flagged",
                        company.company,
                        company.totals.count,
                        company.totals.sum_excl_vat,
                        company.totals.flagged_count
                    );
                }
            }
        }
    }

    Ok(())
}
