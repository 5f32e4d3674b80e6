//! Optimistic transactions.

use std::collections::BTreeMap;
use std::time::Duration;

use shared_types::{Document, DocumentPath};

use super::errors::StoreError;
use super::write::{check_len, WriteOp};
use crate::ports::DocumentStore;

/// A document together with the version it was read at.
///
/// Absent documents report version 0. Versions are never reused by a store,
/// so an equal version means the document did not change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Versioned {
    pub document: Option<Document>,
    pub version: u64,
}

/// Retry policy for [`crate::run_transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfig {
    /// Attempts before giving up with `StoreError::TooMuchContention`.
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly per attempt.
    pub base_backoff: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(20),
        }
    }
}

impl TransactionConfig {
    /// Configuration for tests (no backoff).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::ZERO,
        }
    }
}

/// Reads and buffered writes of one transaction attempt.
///
/// Reads go through [`Transaction::get`] so their versions are recorded;
/// writes are buffered and applied atomically on commit.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    reads: BTreeMap<DocumentPath, u64>,
    writes: Vec<WriteOp>,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a document and record the version observed.
    pub async fn get(
        &mut self,
        store: &dyn DocumentStore,
        path: &DocumentPath,
    ) -> Result<Option<Document>, StoreError> {
        let versioned = store.get_versioned(path).await?;
        self.reads.entry(path.clone()).or_insert(versioned.version);
        Ok(versioned.document)
    }

    /// Buffer a write.
    pub fn push(&mut self, op: WriteOp) -> Result<(), StoreError> {
        check_len(self.writes.len() + 1)?;
        self.writes.push(op);
        Ok(())
    }

    /// Versions observed by this attempt.
    #[must_use]
    pub fn reads(&self) -> &BTreeMap<DocumentPath, u64> {
        &self.reads
    }

    #[must_use]
    pub fn writes(&self) -> &[WriteOp] {
        &self.writes
    }

    /// A transaction without writes commits trivially.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<DocumentPath, u64>, Vec<WriteOp>) {
        (self.reads, self.writes)
    }
}
