//! Error types for the document store.

use thiserror::Error;

/// Errors that can occur when reading or writing documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Batch too large: {count} writes > {max}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Transaction contention on {path}")]
    Contention { path: String },

    #[error("Transaction gave up after {attempts} attempts due to contention")]
    TooMuchContention { attempts: u32 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid document at {path}: {reason}")]
    InvalidDocument { path: String, reason: String },
}

impl StoreError {
    /// Whether re-running the same unit of work may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Contention { .. } | Self::TooMuchContention { .. } | Self::Unavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(StoreError::Unavailable("down".into()).is_retryable());
        assert!(StoreError::Contention { path: "a/b".into() }.is_retryable());
        assert!(!StoreError::BatchTooLarge { count: 501, max: 500 }.is_retryable());
        assert!(!StoreError::InvalidDocument {
            path: "a/b".into(),
            reason: "bad".into()
        }
        .is_retryable());
    }
}
