use sg_01_document_store::StoreError;
use shared_types::UserId;
use thiserror::Error;

/// Errors raised by relationship operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationshipError {
    #[error("User {0} cannot follow themselves")]
    SelfRelationship(UserId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RelationshipError {
    /// Malformed input is never retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SelfRelationship(_) => false,
            Self::Store(e) => e.is_retryable(),
        }
    }
}
