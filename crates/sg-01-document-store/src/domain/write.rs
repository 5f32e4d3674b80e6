//! Write operations, batches and their merge semantics.

use serde_json::Value;
use shared_types::{Document, DocumentPath};

use super::errors::StoreError;

/// Hard ceiling on writes committed in one atomic unit.
pub const MAX_BATCH_WRITES: usize = 500;

/// A single document write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Merge `fields` into the document, creating it if absent.
    /// `defaults` are written only on creation and never overwrite.
    Upsert {
        path: DocumentPath,
        fields: Document,
        defaults: Document,
    },
    /// Create the document only if it does not exist.
    CreateIfAbsent { path: DocumentPath, document: Document },
    /// Remove the document if present.
    Delete { path: DocumentPath },
}

/// Effect of a write against the current state of its document.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing to write.
    Unchanged,
    /// Store this document.
    Put(Document),
    /// Remove the document.
    Remove,
}

impl WriteOp {
    /// Merge upsert without insert-only defaults.
    #[must_use]
    pub fn upsert(path: DocumentPath, fields: Document) -> Self {
        Self::Upsert {
            path,
            fields,
            defaults: Document::new(),
        }
    }

    /// Merge upsert with fields that are only written on creation.
    #[must_use]
    pub fn upsert_with_defaults(path: DocumentPath, fields: Document, defaults: Document) -> Self {
        Self::Upsert {
            path,
            fields,
            defaults,
        }
    }

    #[must_use]
    pub fn create_if_absent(path: DocumentPath, document: Document) -> Self {
        Self::CreateIfAbsent { path, document }
    }

    #[must_use]
    pub fn delete(path: DocumentPath) -> Self {
        Self::Delete { path }
    }

    /// The document this operation targets.
    #[must_use]
    pub fn path(&self) -> &DocumentPath {
        match self {
            Self::Upsert { path, .. } | Self::CreateIfAbsent { path, .. } | Self::Delete { path } => {
                path
            }
        }
    }

    /// Resolve this write against the document's current state.
    #[must_use]
    pub fn resolve(&self, current: Option<&Document>) -> Resolution {
        match (self, current) {
            (Self::Upsert { fields, .. }, Some(existing)) => {
                let mut merged = existing.clone();
                merge_fields(&mut merged, fields);
                if &merged == existing {
                    Resolution::Unchanged
                } else {
                    Resolution::Put(merged)
                }
            }
            (
                Self::Upsert {
                    fields, defaults, ..
                },
                None,
            ) => {
                let mut created = defaults.clone();
                merge_fields(&mut created, fields);
                Resolution::Put(created)
            }
            (Self::CreateIfAbsent { .. }, Some(_)) => Resolution::Unchanged,
            (Self::CreateIfAbsent { document, .. }, None) => Resolution::Put(document.clone()),
            (Self::Delete { .. }, Some(_)) => Resolution::Remove,
            (Self::Delete { .. }, None) => Resolution::Unchanged,
        }
    }
}

/// Deep-merge `fields` into `target`.
///
/// Nested objects are merged key by key; every other value replaces what
/// was there, including `null`.
pub fn merge_fields(target: &mut Document, fields: &Document) {
    for (key, value) in fields {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_fields(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// An ordered set of writes committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch, rejecting more than [`MAX_BATCH_WRITES`] operations.
    pub fn from_ops(ops: Vec<WriteOp>) -> Result<Self, StoreError> {
        check_len(ops.len())?;
        Ok(Self { ops })
    }

    /// Append one write.
    pub fn push(&mut self, op: WriteOp) -> Result<(), StoreError> {
        check_len(self.ops.len() + 1)?;
        self.ops.push(op);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

pub(crate) fn check_len(count: usize) -> Result<(), StoreError> {
    if count > MAX_BATCH_WRITES {
        return Err(StoreError::BatchTooLarge {
            count,
            max: MAX_BATCH_WRITES,
        });
    }
    Ok(())
}

/// Outcome of a committed batch or transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Documents whose stored state changed.
    pub applied: usize,
    /// Writes that left their document unchanged.
    pub skipped: usize,
}
