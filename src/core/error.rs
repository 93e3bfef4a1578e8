use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::RecordField;

/// Errors raised at the boundary of the engine (configuration, snapshots, storage).
///
/// Data problems inside a record are never errors; they are reported as
/// [`ValidationIssue`]s.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Invalid configuration value or period key.
    #[error("configuration error: {0}")]
    Config(String),

    /// The record store failed to fetch or delete.
    #[error("store error: {0}")]
    Store(String),

    /// A JSON snapshot or config could not be decoded.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a snapshot or config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The closed set of findings the validator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// A required field is missing or blank.
    EmptyField,
    /// An amount is below zero.
    NegativeAmount,
    /// An amount exceeds the configured ceiling.
    AmountTooLarge,
    /// The date cannot be read, or lies too far in the future.
    InvalidDate,
    /// The VAT amount matches none of the known rates.
    VatAmountMismatch,
    /// Other records carry the same invoice number.
    DuplicateInvoiceId,
    /// The VAT number is shaped unlike every other VAT number in the dataset.
    VatFormatMismatch,
    /// The company number is shaped unlike every other company number in the dataset.
    CompanyNumberFormatMismatch,
    /// The same company appears elsewhere with a different VAT number.
    CompanyVatMismatch,
}

impl IssueKind {
    pub const ALL: [IssueKind; 9] = [
        Self::EmptyField,
        Self::NegativeAmount,
        Self::AmountTooLarge,
        Self::InvalidDate,
        Self::VatAmountMismatch,
        Self::DuplicateInvoiceId,
        Self::VatFormatMismatch,
        Self::CompanyNumberFormatMismatch,
        Self::CompanyVatMismatch,
    ];

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyField => "EMPTY_FIELD",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AmountTooLarge => "AMOUNT_TOO_LARGE",
            Self::InvalidDate => "INVALID_DATE",
            Self::VatAmountMismatch => "VAT_AMOUNT_MISMATCH",
            Self::DuplicateInvoiceId => "DUPLICATE_INVOICE_ID",
            Self::VatFormatMismatch => "VAT_FORMAT_MISMATCH",
            Self::CompanyNumberFormatMismatch => "COMPANY_NUMBER_FORMAT_MISMATCH",
            Self::CompanyVatMismatch => "COMPANY_VAT_MISMATCH",
        }
    }

    /// Parse from the machine-readable code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single finding on one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// What kind of problem this is.
    pub kind: IssueKind,
    /// The field the problem was found on.
    pub field: RecordField,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, field: RecordField, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_codes_roundtrip() {
        for kind in IssueKind::ALL {
            assert_eq!(IssueKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(IssueKind::from_code("NOPE"), None);
    }

    #[test]
    fn issue_display() {
        let issue = ValidationIssue::new(
            IssueKind::EmptyField,
            RecordField::VatNumber,
            "VAT number is missing",
        );
        assert_eq!(issue.to_string(), "[EMPTY_FIELD] vat_number: VAT number is missing");
    }
}
