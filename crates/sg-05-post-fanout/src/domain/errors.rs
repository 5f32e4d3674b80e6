use sg_01_document_store::StoreError;
use sg_03_relationships::RelationshipError;
use thiserror::Error;

use super::report::FanoutReport;

/// Errors raised by the fanout engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FanoutError {
    #[error("Malformed post {post_id}: {reason}")]
    MalformedPost { post_id: String, reason: String },

    #[error("Chunk size {size} outside 1..={max}")]
    InvalidChunkSize { size: usize, max: usize },

    #[error(
        "Fanout of post {} failed for {} of {} chunks: {source}",
        .report.post_id,
        .report.failed_chunks.len(),
        .report.chunks
    )]
    PartialFailure {
        report: FanoutReport,
        source: StoreError,
    },

    #[error("Follower read failed: {0}")]
    Relationship(#[from] RelationshipError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FanoutError {
    /// Malformed posts are dropped; store failures are redelivered.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MalformedPost { .. } | Self::InvalidChunkSize { .. } => false,
            Self::PartialFailure { .. } => true,
            Self::Relationship(e) => e.is_retryable(),
            Self::Store(e) => e.is_retryable(),
        }
    }
}
