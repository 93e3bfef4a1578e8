#![cfg(feature = "report")]

use belegpruefer::core::*;
use belegpruefer::report::*;
use belegpruefer::{Engine, EngineConfig};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn engine() -> Engine {
    Engine::default().with_today(today())
}

fn record(
    id: i64,
    date: &str,
    company: Option<&str>,
    direction: InvoiceDirection,
) -> InvoiceRecord {
    let mut builder = InvoiceRecordBuilder::new(id)
        .external_id(format!("INV-{id}"))
        .date(date)
        .amounts(dec!(100.00), dec!(21.00))
        .vat_number("LT100000001")
        .company_number(format!("30000000{id}"))
        .direction(direction);
    if let Some(company) = company {
        builder = builder.company(company);
    }
    builder.build()
}

fn mixed_snapshot() -> Vec<InvoiceRecord> {
    use InvoiceDirection::*;
    let mut records = vec![
        record(1, "2025-01-05", Some("UAB Alfa"), Purchase),
        record(2, "12.01.2025", Some("UAB Alfa"), Purchase),
        record(3, "2025-01-20", Some("UAB Beta"), Sales),
        record(4, "03/03/2025", None, Purchase),
        record(5, "2025-03-15", Some("uab gama"), Sales),
        record(6, "2025-03-16", Some("UAB Beta"), Sales),
        record(7, "2024-12-31", Some("UAB Alfa"), Purchase),
        record(8, "someday", Some("UAB Alfa"), Purchase),
    ];
    records[5].vat_amount = Some(dec!(3.00));
    records
}

fn assert_rolls_up(summary: &PeriodSummary) {
    let sum = |totals: Vec<&SummaryTotals>| {
        let mut acc = SummaryTotals::default();
        for t in totals {
            acc += t;
        }
        acc
    };
    assert_eq!(summary.totals, sum(summary.months.iter().map(|m| &m.totals).collect()));
    for month in &summary.months {
        assert_eq!(month.totals, sum(month.directions.iter().map(|d| &d.totals).collect()));
        for direction in &month.directions {
            assert_eq!(
                direction.totals,
                sum(direction.companies.iter().map(|c| &c.totals).collect())
            );
            for company in &direction.companies {
                assert_eq!(company.totals.count, company.record_ids.len());
                assert!(company.totals.flagged_count <= company.totals.count);
            }
        }
    }
}

#[test]
fn parents_are_sums_of_children() {
    let records = mixed_snapshot();
    let summary = engine().summarize(&records, 2025);
    assert_rolls_up(&summary);
    assert_eq!(summary.totals.count, 6);
    assert_eq!(summary.totals.sum_excl_vat, dec!(600.00));
    assert_eq!(summary.totals.sum_vat, dec!(108.00));
    // Record 4 has no company, record 6 carries 3% VAT.
    assert_eq!(summary.totals.flagged_count, 2);
}

#[test]
fn tree_order() {
    let records = mixed_snapshot();
    let summary = engine().summarize(&records, 2025);

    let periods: Vec<String> = summary.months.iter().map(|m| m.period.to_string()).collect();
    assert_eq!(periods, vec!["2025-03", "2025-01"]);

    let march = &summary.months[0];
    let directions: Vec<InvoiceDirection> = march.directions.iter().map(|d| d.direction).collect();
    assert_eq!(directions, vec![InvoiceDirection::Sales, InvoiceDirection::Purchase]);

    let sales: Vec<&str> = march.directions[0]
        .companies
        .iter()
        .map(|c| c.company.as_str())
        .collect();
    assert_eq!(sales, vec!["UAB Beta", "uab gama"]);
    assert_eq!(march.directions[1].companies[0].company, UNKNOWN_COMPANY);
}

#[test]
fn drill_down_matches_leaves() {
    let records = mixed_snapshot();
    let engine = engine();
    let summary = engine.summarize(&records, 2025);
    let aggregator = engine.aggregator(&records);

    for month in &summary.months {
        assert_eq!(aggregator.records_for_month(month.period).len(), month.totals.count);
        for direction in &month.directions {
            for company in &direction.companies {
                let ids: Vec<RecordId> = aggregator
                    .records_for(month.period, direction.direction, &company.company)
                    .iter()
                    .map(|r| r.id)
                    .collect();
                assert_eq!(ids, company.record_ids);
            }
        }
    }

    let january = "2025-01".parse().unwrap();
    let ids: Vec<RecordId> = aggregator
        .records_for(january, InvoiceDirection::Purchase, "UAB Alfa")
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![RecordId(1), RecordId(2)]);
}

#[test]
fn undated_records_are_flagged_but_not_summarized() {
    let records = mixed_snapshot();
    let engine = engine();
    let issues = engine.validate_all(&records);
    let kinds: Vec<IssueKind> = issues[&RecordId(8)].iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IssueKind::InvalidDate]);

    let summary = engine.summarize_with(&records, 2025, &issues);
    let summarized: Vec<RecordId> = summary
        .months
        .iter()
        .flat_map(|m| &m.directions)
        .flat_map(|d| &d.companies)
        .flat_map(|c| c.record_ids.iter().copied())
        .collect();
    assert!(!summarized.contains(&RecordId(8)));
    assert!(!summarized.contains(&RecordId(7)));
}

#[test]
fn year_selection() {
    let records = mixed_snapshot();
    assert_eq!(engine().available_years(&records), vec![2025, 2024]);

    let previous = engine().summarize(&records, 2024);
    assert_eq!(previous.totals.count, 1);
    assert!(engine().summarize(&records, 2023).is_empty());

    let undated = vec![record(1, "n/a", Some("UAB Alfa"), InvoiceDirection::Purchase)];
    assert_eq!(engine().available_years(&undated), vec![2025]);
}

#[test]
fn configured_order_and_label() {
    let config = EngineConfig {
        report: ReportConfig {
            company_order: CompanyOrder::CaseInsensitive,
            unknown_company_label: "(no company)".into(),
        },
        ..Default::default()
    };
    let records = vec![
        record(1, "2025-02-01", Some("beta"), InvoiceDirection::Purchase),
        record(2, "2025-02-02", Some("Alfa"), InvoiceDirection::Purchase),
        record(3, "2025-02-03", Some("Gama"), InvoiceDirection::Purchase),
        record(4, "2025-02-04", None, InvoiceDirection::Purchase),
    ];
    let summary = Engine::new(config).with_today(today()).summarize(&records, 2025);
    let names: Vec<&str> = summary.months[0].directions[0]
        .companies
        .iter()
        .map(|c| c.company.as_str())
        .collect();
    assert_eq!(names, vec!["(no company)", "Alfa", "beta", "Gama"]);
}

#[test]
fn summary_serializes_to_json() {
    let records = vec![record(1, "2025-04-01", Some("UAB Alfa"), InvoiceDirection::Sales)];
    let summary = engine().summarize(&records, 2025);
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["year"], 2025);
    assert_eq!(json["totals"]["count"], 1);
    assert_eq!(json["totals"]["sum_excl_vat"], "100.00");
    let month = &json["months"][0];
    assert_eq!(month["period"]["month"], 4);
    assert_eq!(month["directions"][0]["direction"], "Sales");
    assert_eq!(month["directions"][0]["companies"][0]["record_ids"][0], 1);

    let back: PeriodSummary = serde_json::from_value(json).unwrap();
    assert_eq!(back, summary);
}
