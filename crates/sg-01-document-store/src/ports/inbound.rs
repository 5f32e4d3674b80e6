//! Driving port: the document store every subsystem reads and writes.

use async_trait::async_trait;
use shared_types::{CollectionPath, Document, DocumentPath};

use crate::domain::{CommitSummary, StoreError, Transaction, Versioned, WriteBatch, WriteOp};

/// Document store API.
///
/// Implementations must apply a batch or transaction all-or-nothing and must
/// never reuse a document version.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document with its current version.
    async fn get_versioned(&self, path: &DocumentPath) -> Result<Versioned, StoreError>;

    /// List the direct children of a collection, ordered by path.
    async fn list(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<(DocumentPath, Document)>, StoreError>;

    /// Commit a batch atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<CommitSummary, StoreError>;

    /// Commit a transaction atomically, failing with
    /// `StoreError::Contention` if any document it read has changed.
    async fn commit_transaction(&self, tx: Transaction) -> Result<CommitSummary, StoreError>;

    /// Read a document.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        Ok(self.get_versioned(path).await?.document)
    }

    /// Commit a single write.
    async fn apply(&self, op: WriteOp) -> Result<CommitSummary, StoreError> {
        let mut batch = WriteBatch::new();
        batch.push(op)?;
        self.commit(batch).await
    }
}
