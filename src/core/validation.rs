use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dates::DateNormalizer;
use super::error::{EngineError, IssueKind, ValidationIssue};
use super::signature::FormatSignature;
use super::types::*;

/// Issues per record, keyed by storage id. Every validated record has an
/// entry; records without findings map to an empty list.
pub type IssueMap = BTreeMap<RecordId, Vec<ValidationIssue>>;

/// VAT rates an invoice may carry, as fractions.
pub const DEFAULT_VAT_RATES: [Decimal; 4] = [dec!(0.21), dec!(0.09), dec!(0.05), dec!(0)];

/// Absolute tolerance when matching a VAT amount against a rate.
pub const DEFAULT_VAT_TOLERANCE: Decimal = dec!(0.03);

/// Largest plausible amount on a single invoice.
pub const DEFAULT_AMOUNT_CEILING: Decimal = dec!(1_000_000);

/// How far into the future an invoice date may lie, in calendar months.
pub const DEFAULT_MAX_FUTURE_MONTHS: u32 = 2;

/// Thresholds used by [`InvoiceValidator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Accepted VAT rates as fractions (0.21 = 21%).
    pub vat_rates: Vec<Decimal>,
    /// Absolute tolerance for the VAT rate check.
    pub vat_tolerance: Decimal,
    /// Amounts above this are flagged.
    pub amount_ceiling: Decimal,
    /// Dates more than this many months after today are flagged.
    pub max_future_months: u32,
    /// Ignore whitespace and letter case when comparing a company's VAT
    /// numbers. Off by default: trimmed values must match exactly.
    pub fold_vat_numbers: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            vat_rates: DEFAULT_VAT_RATES.to_vec(),
            vat_tolerance: DEFAULT_VAT_TOLERANCE,
            amount_ceiling: DEFAULT_AMOUNT_CEILING,
            max_future_months: DEFAULT_MAX_FUTURE_MONTHS,
            fold_vat_numbers: false,
        }
    }
}

impl ValidatorConfig {
    /// Reject configurations that would make every check meaningless.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.vat_rates.is_empty() {
            return Err(EngineError::Config("at least one VAT rate is required".into()));
        }
        if let Some(rate) = self
            .vat_rates
            .iter()
            .find(|r| r.is_sign_negative() || **r > Decimal::ONE)
        {
            return Err(EngineError::Config(format!(
                "VAT rate {rate} must be a fraction between 0 and 1"
            )));
        }
        if self.vat_tolerance.is_sign_negative() {
            return Err(EngineError::Config(format!(
                "VAT tolerance {} must not be negative",
                self.vat_tolerance
            )));
        }
        if self.amount_ceiling <= Decimal::ZERO {
            return Err(EngineError::Config(format!(
                "amount ceiling {} must be positive",
                self.amount_ceiling
            )));
        }
        Ok(())
    }
}

/// Checks invoice records on their own and against the rest of the dataset.
///
/// All checks run on every call; a failing check never stops the others.
/// Checks that need a value skip silently when it is missing, except the
/// required-field check, for which absence is the finding.
#[derive(Debug, Clone)]
pub struct InvoiceValidator {
    config: ValidatorConfig,
    today: NaiveDate,
    normalizer: DateNormalizer,
}

impl Default for InvoiceValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl InvoiceValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let today = Local::now().date_naive();
        Self {
            config,
            today,
            normalizer: DateNormalizer::new(today),
        }
    }

    /// Pin "today" for the future-date check and two-digit year expansion.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self.normalizer = DateNormalizer::new(today);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// Validate one record. `all` is the full snapshot; the record itself may
    /// be part of it and is excluded from cross-record checks by id.
    pub fn validate(&self, record: &InvoiceRecord, all: &[InvoiceRecord]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        check_required_fields(record, &mut issues);
        check_non_negative(record, &mut issues);
        self.check_ceiling(record, &mut issues);
        self.check_date(record, &mut issues);
        self.check_vat_rate(record, &mut issues);

        check_duplicate_id(record, all, &mut issues);
        check_format_drift(record, all, &VAT_NUMBER_DRIFT, &mut issues);
        check_format_drift(record, all, &COMPANY_NUMBER_DRIFT, &mut issues);
        self.check_company_vat(record, all, &mut issues);

        issues
    }

    /// Validate every record of a snapshot.
    pub fn validate_all(&self, records: &[InvoiceRecord]) -> IssueMap {
        let issues: IssueMap = records
            .iter()
            .map(|record| (record.id, self.validate(record, records)))
            .collect();
        debug!(
            records = records.len(),
            flagged = issues.values().filter(|i| !i.is_empty()).count(),
            "validated invoice snapshot"
        );
        issues
    }

    fn check_ceiling(&self, record: &InvoiceRecord, issues: &mut Vec<ValidationIssue>) {
        let ceiling = self.config.amount_ceiling;
        for (field, amount) in amounts_of(record) {
            if amount > ceiling {
                issues.push(ValidationIssue::new(
                    IssueKind::AmountTooLarge,
                    field,
                    format!("amount {amount} exceeds the ceiling of {ceiling}"),
                ));
            }
        }
    }

    fn check_date(&self, record: &InvoiceRecord, issues: &mut Vec<ValidationIssue>) {
        let Some(raw) = non_blank(&record.date) else {
            return;
        };
        match self.normalizer.normalize(raw) {
            Err(err) => issues.push(ValidationIssue::new(
                IssueKind::InvalidDate,
                RecordField::Date,
                err.to_string(),
            )),
            Ok(date) => {
                let months = self.config.max_future_months;
                let limit = self
                    .today
                    .checked_add_months(Months::new(months))
                    .unwrap_or(NaiveDate::MAX);
                if date > limit {
                    issues.push(ValidationIssue::new(
                        IssueKind::InvalidDate,
                        RecordField::Date,
                        format!("date {date} is more than {months} months in the future"),
                    ));
                }
            }
        }
    }

    fn check_vat_rate(&self, record: &InvoiceRecord, issues: &mut Vec<ValidationIssue>) {
        let (Some(amount), Some(vat)) = (record.amount_excl_vat, record.vat_amount) else {
            return;
        };
        let tolerance = self.config.vat_tolerance;
        let matches_any = self
            .config
            .vat_rates
            .iter()
            .any(|rate| {
                // Out-of-range products never match a rate.
                amount
                    .checked_mul(*rate)
                    .and_then(|expected| vat.checked_sub(expected))
                    .is_some_and(|diff| diff.abs() <= tolerance)
            });
        if !matches_any {
            let rates: Vec<String> = self
                .config
                .vat_rates
                .iter()
                .map(|rate| format!("{}%", (rate * dec!(100)).normalize()))
                .collect();
            issues.push(ValidationIssue::new(
                IssueKind::VatAmountMismatch,
                RecordField::VatAmount,
                format!(
                    "VAT {vat} does not match any rate ({}) of net amount {amount}",
                    rates.join(", ")
                ),
            ));
        }
    }

    fn vat_key<'a>(&self, vat: &'a str) -> Cow<'a, str> {
        if self.config.fold_vat_numbers {
            folded_vat(vat)
        } else {
            Cow::Borrowed(vat)
        }
    }

    fn check_company_vat(
        &self,
        record: &InvoiceRecord,
        all: &[InvoiceRecord],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let (Some(company), Some(vat)) = (record.company(), record.vat()) else {
            return;
        };
        let own = self.vat_key(vat);

        let conflicting: BTreeSet<&str> = all
            .iter()
            .filter(|other| other.id != record.id && other.company() == Some(company))
            .filter_map(InvoiceRecord::vat)
            .filter(|other_vat| self.vat_key(other_vat) != own)
            .collect();

        if !conflicting.is_empty() {
            let listed: Vec<&str> = conflicting.into_iter().collect();
            issues.push(ValidationIssue::new(
                IssueKind::CompanyVatMismatch,
                RecordField::VatNumber,
                format!(
                    "company '{company}' also appears with VAT number(s) {}",
                    listed.join(", ")
                ),
            ));
        }
    }
}

fn amounts_of(record: &InvoiceRecord) -> impl Iterator<Item = (RecordField, Decimal)> {
    [
        (RecordField::AmountExclVat, record.amount_excl_vat),
        (RecordField::VatAmount, record.vat_amount),
    ]
    .into_iter()
    .filter_map(|(field, amount)| amount.map(|a| (field, a)))
}

fn check_required_fields(record: &InvoiceRecord, issues: &mut Vec<ValidationIssue>) {
    for field in RecordField::REQUIRED {
        if !field.is_present(record) {
            issues.push(ValidationIssue::new(
                IssueKind::EmptyField,
                field,
                format!("{field} must not be empty"),
            ));
        }
    }
}

fn check_non_negative(record: &InvoiceRecord, issues: &mut Vec<ValidationIssue>) {
    for (field, amount) in amounts_of(record) {
        if amount < Decimal::ZERO {
            issues.push(ValidationIssue::new(
                IssueKind::NegativeAmount,
                field,
                format!("amount {amount} must not be negative"),
            ));
        }
    }
}

fn check_duplicate_id(
    record: &InvoiceRecord,
    all: &[InvoiceRecord],
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(external_id) = record.external_id() else {
        return;
    };
    let others = all
        .iter()
        .filter(|other| other.id != record.id && other.external_id() == Some(external_id))
        .count();
    if others > 0 {
        issues.push(ValidationIssue::new(
            IssueKind::DuplicateInvoiceId,
            RecordField::ExternalInvoiceId,
            format!("invoice number '{external_id}' is also used by {others} other record(s)"),
        ));
    }
}

/// One identifier field checked for shape drift.
struct DriftCheck {
    field: RecordField,
    kind: IssueKind,
    label: &'static str,
    value: fn(&InvoiceRecord) -> Option<&str>,
    signature: fn(&str) -> FormatSignature,
}

const VAT_NUMBER_DRIFT: DriftCheck = DriftCheck {
    field: RecordField::VatNumber,
    kind: IssueKind::VatFormatMismatch,
    label: "VAT numbers",
    value: InvoiceRecord::vat,
    signature: FormatSignature::vat_number,
};

const COMPANY_NUMBER_DRIFT: DriftCheck = DriftCheck {
    field: RecordField::CompanyNumber,
    kind: IssueKind::CompanyNumberFormatMismatch,
    label: "company numbers",
    value: InvoiceRecord::company_no,
    signature: FormatSignature::company_number,
};

/// Signatures listed in a drift message.
const MAX_LISTED_SIGNATURES: usize = 5;

fn check_format_drift(
    record: &InvoiceRecord,
    all: &[InvoiceRecord],
    check: &DriftCheck,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(value) = (check.value)(record) else {
        return;
    };
    let own = (check.signature)(value);

    let mut compared = 0usize;
    let mut seen = BTreeSet::new();
    for other in all.iter().filter(|other| other.id != record.id) {
        if let Some(other_value) = (check.value)(other) {
            compared += 1;
            seen.insert((check.signature)(other_value));
        }
    }

    // No evidence, no finding.
    if compared == 0 || seen.contains(&own) {
        return;
    }

    let mut listed: Vec<String> = seen
        .iter()
        .take(MAX_LISTED_SIGNATURES)
        .map(ToString::to_string)
        .collect();
    if seen.len() > MAX_LISTED_SIGNATURES {
        listed.push(format!("and {} more", seen.len() - MAX_LISTED_SIGNATURES));
    }
    issues.push(ValidationIssue::new(
        check.kind,
        check.field,
        format!(
            "format {own} matches none of {compared} other {} (seen: {})",
            check.label,
            listed.join(", ")
        ),
    ));
}

fn folded_vat(vat: &str) -> Cow<'_, str> {
    Cow::Owned(
        vat.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect(),
    )
}

/// Validate one record against a snapshot with the default configuration.
pub fn validate_record(record: &InvoiceRecord, all: &[InvoiceRecord]) -> Vec<ValidationIssue> {
    InvoiceValidator::default().validate(record, all)
}

/// Validate a whole snapshot with the default configuration.
pub fn validate_all(records: &[InvoiceRecord]) -> IssueMap {
    InvoiceValidator::default().validate_all(records)
}

/// Ids of records with at least one issue, in id order.
pub fn flagged_ids(issues: &IssueMap) -> Vec<RecordId> {
    issues
        .iter()
        .filter(|(_, list)| !list.is_empty())
        .map(|(id, _)| *id)
        .collect()
}

/// Number of issues per kind across a whole issue map.
pub fn issue_counts(issues: &IssueMap) -> BTreeMap<IssueKind, usize> {
    let mut counts = BTreeMap::new();
    for issue in issues.values().flatten() {
        *counts.entry(issue.kind).or_insert(0) += 1;
    }
    counts
}
