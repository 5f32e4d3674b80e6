use sg_01_document_store::StoreError;
use thiserror::Error;

/// Errors raised by the notification store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("Invalid notification key: {0:?}")]
    InvalidKey(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl NotificationError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidKey(_) => false,
            Self::Store(e) => e.is_retryable(),
        }
    }
}
