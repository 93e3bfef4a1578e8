//! Property-based tests for date normalization, validation and summaries.
//!
//! Run with: `cargo test --features all --test proptest_tests`

#![cfg(feature = "report")]

use belegpruefer::core::*;
use belegpruefer::report::*;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// Any calendar date in the plausible range.
fn arb_date(years: std::ops::RangeInclusive<i32>) -> impl Strategy<Value = NaiveDate> {
    (years, 1u32..=12, 1u32..=31)
        .prop_filter_map("not a calendar date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn arb_amount() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::of((0i64..50_000_000).prop_map(|cents| Decimal::new(cents, 2)))
}

fn arb_date_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        arb_date(2024..=2025).prop_map(|d| d.format("%Y-%m-%d").to_string()),
        arb_date(2024..=2025).prop_map(|d| d.format("%d.%m.%Y").to_string()),
        arb_date(2024..=2025).prop_map(|d| d.format("%d/%m/%y").to_string()),
        Just("not a date".to_string()),
    ])
}

fn arb_record(id: i64) -> impl Strategy<Value = InvoiceRecord> {
    (
        prop::option::of(prop::sample::select(vec!["INV-1", "INV-2", "INV-3", "X"])),
        arb_date_text(),
        prop::option::of(prop::sample::select(vec!["UAB Alfa", "uab beta", "Gama"])),
        arb_amount(),
        arb_amount(),
        prop::option::of(prop::sample::select(vec!["LT100000001", "LT100000002", "123456789"])),
        prop::option::of(prop::sample::select(vec!["300000001", "HRB 123"])),
        prop::option::of(prop_oneof![
            Just(InvoiceDirection::Purchase),
            Just(InvoiceDirection::Sales)
        ]),
    )
        .prop_map(
            move |(external, date, company, amount, vat, vat_number, company_number, direction)| {
                InvoiceRecord {
                    id: RecordId(id),
                    external_invoice_id: external.map(str::to_string),
                    date,
                    company_name: company.map(str::to_string),
                    amount_excl_vat: amount,
                    vat_amount: vat,
                    vat_number: vat_number.map(str::to_string),
                    company_number: company_number.map(str::to_string),
                    invoice_direction: direction,
                }
            },
        )
}

fn arb_records() -> impl Strategy<Value = Vec<InvoiceRecord>> {
    (0usize..12).prop_flat_map(|n| (0..n as i64).map(arb_record).collect::<Vec<_>>())
}

fn check_rolls_up(summary: &PeriodSummary) -> Result<(), TestCaseError> {
    let mut months = SummaryTotals::default();
    for month in &summary.months {
        let mut directions = SummaryTotals::default();
        for direction in &month.directions {
            let mut companies = SummaryTotals::default();
            for company in &direction.companies {
                prop_assert_eq!(company.totals.count, company.record_ids.len());
                companies += &company.totals;
            }
            prop_assert_eq!(&direction.totals, &companies);
            directions += &direction.totals;
        }
        prop_assert_eq!(&month.totals, &directions);
        months += &month.totals;
    }
    prop_assert_eq!(&summary.totals, &months);
    Ok(())
}

proptest! {
    /// Every four-digit-year format reads back the date it was written from.
    #[test]
    fn four_digit_formats_roundtrip(
        date in arb_date(1900..=2100),
        format in prop::sample::select(vec![
            "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y",
            "%Y.%m.%d", "%Y/%m/%d", "%Y-%m-%d",
            "%Y%m%d", "%d%m%Y",
        ]),
    ) {
        let raw = date.format(format).to_string();
        prop_assert_eq!(DateNormalizer::new(reference()).normalize(&raw), Ok(date));
    }

    /// Two-digit years expand into the reference century.
    #[test]
    fn two_digit_formats_roundtrip(
        date in arb_date(2000..=2099),
        format in prop::sample::select(vec!["%d.%m.%y", "%d/%m/%y", "%d-%m-%y", "%d%m%y"]),
    ) {
        let raw = date.format(format).to_string();
        prop_assert_eq!(DateNormalizer::new(reference()).normalize(&raw), Ok(date));
    }

    /// Whatever is accepted normalizes to a canonical form that reads back unchanged.
    #[test]
    fn accepted_dates_are_stable(raw in "[0-9./ -]{0,12}") {
        let normalizer = DateNormalizer::new(reference());
        if let Ok(date) = normalizer.normalize(&raw) {
            let canonical = normalizer.canonical(&raw).unwrap();
            prop_assert_eq!(&canonical, &date.format("%Y-%m-%d").to_string());
            prop_assert_eq!(normalizer.normalize(&canonical), Ok(date));
        }
    }

    /// Arbitrary input never panics.
    #[test]
    fn arbitrary_text_never_panics(raw in any::<String>()) {
        let normalizer = DateNormalizer::new(reference());
        let _ = normalizer.normalize(&raw);
        let _ = normalizer.recency_key(Some(&raw));
    }

    /// Every record gets an entry and a second run gives the same result.
    #[test]
    fn validation_is_idempotent(records in arb_records()) {
        let validator = InvoiceValidator::default().with_today(reference());
        let first = validator.validate_all(&records);
        prop_assert_eq!(first.len(), records.len());
        prop_assert_eq!(&first, &validator.validate_all(&records));
    }

    /// Summary totals roll up at every level and cover exactly the dated records of the year.
    #[test]
    fn summaries_roll_up(records in arb_records(), year in 2024i32..=2025) {
        let issues = InvoiceValidator::default().with_today(reference()).validate_all(&records);
        let aggregator = PeriodAggregator::new(&records).with_today(reference());
        let summary = aggregator.summarize(year, &issues);
        check_rolls_up(&summary)?;

        let normalizer = DateNormalizer::new(reference());
        let in_year: Vec<&InvoiceRecord> = records
            .iter()
            .filter(|r| r.period(&normalizer).is_some_and(|p| p.year == year))
            .collect();
        prop_assert_eq!(summary.totals.count, in_year.len());
        let flagged = in_year.iter().filter(|r| !issues[&r.id].is_empty()).count();
        prop_assert_eq!(summary.totals.flagged_count, flagged);
    }
}
