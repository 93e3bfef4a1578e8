use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::groups::Resolution;
use crate::core::RecordId;
use crate::store::InvoiceStore;

/// Result of deleting one loser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub external_invoice_id: String,
    /// The record kept for this invoice number.
    pub survivor: RecordId,
    /// The record that was to be deleted.
    pub record: RecordId,
    /// Store error message, if the deletion failed.
    pub error: Option<String>,
}

impl DeletionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-record account of a deletion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// True when every requested deletion went through.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Delete the losers of each resolution from `store`.
///
/// Not transactional: a failed deletion is recorded and processing moves on
/// to the next record and the next group. Nothing is retried. Callers treat
/// a partial report as a valid end state and re-run detection on a fresh
/// snapshot.
pub fn delete_losers<S: InvoiceStore>(
    resolutions: &[Resolution<'_>],
    store: &mut S,
) -> DeletionReport {
    let mut report = DeletionReport::default();
    for resolution in resolutions {
        for loser in &resolution.losers {
            let error = match store.delete(loser) {
                Ok(()) => None,
                Err(err) => {
                    warn!(
                        invoice = %resolution.external_invoice_id,
                        record = %loser.id,
                        error = %err,
                        "failed to delete duplicate invoice"
                    );
                    Some(err.to_string())
                }
            };
            report.outcomes.push(DeletionOutcome {
                external_invoice_id: resolution.external_invoice_id.clone(),
                survivor: resolution.survivor.id,
                record: loser.id,
                error,
            });
        }
    }
    debug!(
        attempted = report.attempted(),
        succeeded = report.succeeded(),
        "deleted duplicate invoices"
    );
    report
}
