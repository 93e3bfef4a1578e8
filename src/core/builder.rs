use rust_decimal::Decimal;

use super::types::*;

/// Builder for [`InvoiceRecord`]s.
///
/// Unset fields stay `None`, the same way a partially extracted document would.
///
/// ```
/// use belegpruefer::core::*;
/// use rust_decimal_macros::dec;
///
/// let record = InvoiceRecordBuilder::new(1)
///     .external_id("INV-2025-001")
///     .date("15.01.2025")
///     .company("UAB Baltic Parts")
///     .amounts(dec!(100.00), dec!(21.00))
///     .vat_number("LT123456789")
///     .company_number("304512345")
///     .direction(InvoiceDirection::Sales)
///     .build();
///
/// assert_eq!(record.direction(), InvoiceDirection::Sales);
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceRecordBuilder {
    record: InvoiceRecord,
}

impl InvoiceRecordBuilder {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            record: InvoiceRecord::empty(id),
        }
    }

    pub fn external_id(mut self, id: impl Into<String>) -> Self {
        self.record.external_invoice_id = Some(id.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.record.date = Some(date.into());
        self
    }

    pub fn company(mut self, name: impl Into<String>) -> Self {
        self.record.company_name = Some(name.into());
        self
    }

    pub fn amount_excl_vat(mut self, amount: Decimal) -> Self {
        self.record.amount_excl_vat = Some(amount);
        self
    }

    pub fn vat_amount(mut self, amount: Decimal) -> Self {
        self.record.vat_amount = Some(amount);
        self
    }

    /// Set net and VAT amounts together.
    pub fn amounts(self, excl_vat: Decimal, vat: Decimal) -> Self {
        self.amount_excl_vat(excl_vat).vat_amount(vat)
    }

    pub fn vat_number(mut self, vat_number: impl Into<String>) -> Self {
        self.record.vat_number = Some(vat_number.into());
        self
    }

    pub fn company_number(mut self, company_number: impl Into<String>) -> Self {
        self.record.company_number = Some(company_number.into());
        self
    }

    pub fn direction(mut self, direction: InvoiceDirection) -> Self {
        self.record.invoice_direction = Some(direction);
        self
    }

    pub fn build(self) -> InvoiceRecord {
        self.record
    }
}
