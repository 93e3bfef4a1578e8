//! Interfaces to the store of record.
//!
//! The engine never owns persistent storage. Callers fetch a snapshot through
//! [`InvoiceStore::fetch_all`], run the engine over it, and apply any
//! resulting deletions through [`InvoiceStore::delete`].

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::{EngineError, InvoiceRecord, RecordId};

/// Persistence collaborator holding the full invoice set.
pub trait InvoiceStore {
    type Error: std::error::Error;

    /// Fetch the full snapshot for the current scope.
    fn fetch_all(&self) -> Result<Vec<InvoiceRecord>, Self::Error>;

    /// Delete one record.
    fn delete(&mut self, record: &InvoiceRecord) -> Result<(), Self::Error>;
}

/// Errors from [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("record {0} is locked and cannot be deleted")]
    Locked(RecordId),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err.to_string())
    }
}

/// In-memory [`InvoiceStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<InvoiceRecord>,
    locked: BTreeSet<RecordId>,
}

impl MemoryStore {
    pub fn new(records: Vec<InvoiceRecord>) -> Self {
        Self {
            records,
            locked: BTreeSet::new(),
        }
    }

    /// Load a store from a JSON array of records.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(Self::new(load_snapshot_json(json)?))
    }

    /// Refuse deletion of `id` from now on.
    pub fn lock(&mut self, id: RecordId) {
        self.locked.insert(id);
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl InvoiceStore for MemoryStore {
    type Error = StoreError;

    fn fetch_all(&self) -> Result<Vec<InvoiceRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn delete(&mut self, record: &InvoiceRecord) -> Result<(), StoreError> {
        if self.locked.contains(&record.id) {
            return Err(StoreError::Locked(record.id));
        }
        let index = self
            .records
            .iter()
            .position(|r| r.id == record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        self.records.remove(index);
        Ok(())
    }
}

/// Decode a JSON array of records, as exported by the persistence layer.
#[cfg(feature = "json")]
pub fn load_snapshot_json(json: &str) -> Result<Vec<InvoiceRecord>, EngineError> {
    let records: Vec<InvoiceRecord> = serde_json::from_str(json)?;
    tracing::debug!(records = records.len(), "loaded invoice snapshot");
    Ok(records)
}
