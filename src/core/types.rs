use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::{DateError, DateNormalizer};
use super::error::EngineError;

/// Storage-assigned row identifier.
///
/// Only used to tell rows apart (and to exclude a record from comparisons
/// against "all other records"). It carries no business meaning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Whether an invoice was received (purchase) or issued (sales).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum InvoiceDirection {
    /// Incoming invoice, code `P`.
    #[default]
    #[serde(alias = "P", alias = "purchase")]
    Purchase,
    /// Outgoing invoice, code `S`.
    #[serde(alias = "S", alias = "sales")]
    Sales,
}

impl InvoiceDirection {
    /// Single-letter direction code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Purchase => "P",
            Self::Sales => "S",
        }
    }

    /// Parse from the single-letter direction code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "P" | "p" => Some(Self::Purchase),
            "S" | "s" => Some(Self::Sales),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Purchase => "Purchase",
            Self::Sales => "Sales",
        })
    }
}

/// One invoice as it came out of extraction.
///
/// Every business field is optional: OCR and manual entry routinely leave
/// gaps, and "missing" must stay distinguishable from "present but wrong".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Storage row id.
    pub id: RecordId,
    /// Invoice number as printed on the document. Not unique.
    #[serde(default)]
    pub external_invoice_id: Option<String>,
    /// Date text in whatever shape extraction produced.
    #[serde(default)]
    pub date: Option<String>,
    /// Counterpart name.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Net amount.
    #[serde(default)]
    pub amount_excl_vat: Option<Decimal>,
    /// VAT amount.
    #[serde(default)]
    pub vat_amount: Option<Decimal>,
    /// Counterpart VAT number (e.g. "LT123456789").
    #[serde(default)]
    pub vat_number: Option<String>,
    /// Counterpart company registration number.
    #[serde(default)]
    pub company_number: Option<String>,
    /// Purchase or sales; absent means purchase.
    #[serde(default)]
    pub invoice_direction: Option<InvoiceDirection>,
}

impl InvoiceRecord {
    /// An otherwise empty record with the given storage id.
    pub fn empty(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            external_invoice_id: None,
            date: None,
            company_name: None,
            amount_excl_vat: None,
            vat_amount: None,
            vat_number: None,
            company_number: None,
            invoice_direction: None,
        }
    }

    /// Direction with the purchase default applied.
    pub fn direction(&self) -> InvoiceDirection {
        self.invoice_direction.unwrap_or_default()
    }

    /// Trimmed external invoice id, `None` when absent or blank.
    pub fn external_id(&self) -> Option<&str> {
        non_blank(&self.external_invoice_id)
    }

    /// Trimmed company name, `None` when absent or blank.
    pub fn company(&self) -> Option<&str> {
        non_blank(&self.company_name)
    }

    /// Trimmed VAT number, `None` when absent or blank.
    pub fn vat(&self) -> Option<&str> {
        non_blank(&self.vat_number)
    }

    /// Trimmed company number, `None` when absent or blank.
    pub fn company_no(&self) -> Option<&str> {
        non_blank(&self.company_number)
    }

    /// Parse the date field.
    ///
    /// `None` means the field is missing or blank; `Some(Err(_))` means
    /// text is present but no known date shape matched.
    pub fn parsed_date(
        &self,
        normalizer: &DateNormalizer,
    ) -> Option<Result<NaiveDate, DateError>> {
        non_blank(&self.date).map(|raw| normalizer.normalize(raw))
    }

    /// Reporting period of this record, if its date normalizes.
    pub fn period(&self, normalizer: &DateNormalizer) -> Option<PeriodKey> {
        non_blank(&self.date).and_then(|raw| normalizer.period_key(raw))
    }

    /// Net amount, treating a missing value as zero.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount_excl_vat.unwrap_or(Decimal::ZERO)
    }

    /// VAT amount, treating a missing value as zero.
    pub fn vat_or_zero(&self) -> Decimal {
        self.vat_amount.unwrap_or(Decimal::ZERO)
    }
}

/// Return the trimmed content of an optional string, or `None` if blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A calendar month used to bucket records, displayed as `YYYY-MM`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    /// Create a period key. Returns `None` for a month outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The period a date falls into.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Config(format!("invalid period key '{s}', expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// The record fields the validator reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    ExternalInvoiceId,
    Date,
    CompanyName,
    AmountExclVat,
    VatAmount,
    VatNumber,
    CompanyNumber,
}

impl RecordField {
    /// The fields that must be present on every record, in check order.
    pub const REQUIRED: [RecordField; 7] = [
        Self::ExternalInvoiceId,
        Self::Date,
        Self::CompanyName,
        Self::AmountExclVat,
        Self::VatAmount,
        Self::VatNumber,
        Self::CompanyNumber,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExternalInvoiceId => "external_invoice_id",
            Self::Date => "date",
            Self::CompanyName => "company_name",
            Self::AmountExclVat => "amount_excl_vat",
            Self::VatAmount => "vat_amount",
            Self::VatNumber => "vat_number",
            Self::CompanyNumber => "company_number",
        }
    }

    /// Whether `record` has a usable value for this field.
    pub fn is_present(&self, record: &InvoiceRecord) -> bool {
        match self {
            Self::ExternalInvoiceId => record.external_id().is_some(),
            Self::Date => non_blank(&record.date).is_some(),
            Self::CompanyName => record.company().is_some(),
            Self::AmountExclVat => record.amount_excl_vat.is_some(),
            Self::VatAmount => record.vat_amount.is_some(),
            Self::VatNumber => record.vat().is_some(),
            Self::CompanyNumber => record.company_no().is_some(),
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
