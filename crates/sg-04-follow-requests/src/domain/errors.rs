use sg_01_document_store::StoreError;
use sg_03_relationships::RelationshipError;
use shared_types::UserId;
use thiserror::Error;

/// Errors raised by the follow request machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FollowError {
    #[error("User {0} cannot follow themselves")]
    SelfRelationship(UserId),

    #[error("Malformed follow record at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FollowError {
    /// Only store failures are worth another delivery.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SelfRelationship(_) | Self::Malformed { .. } => false,
            Self::Store(e) => e.is_retryable(),
        }
    }
}

impl From<RelationshipError> for FollowError {
    fn from(e: RelationshipError) -> Self {
        match e {
            RelationshipError::SelfRelationship(uid) => Self::SelfRelationship(uid),
            RelationshipError::Store(e) => Self::Store(e),
        }
    }
}
