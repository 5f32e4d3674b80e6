//! # Fanout Configuration

use sg_01_document_store::MAX_BATCH_WRITES;

use crate::domain::FanoutError;

/// Default followers per batch, a safety margin under the batch ceiling.
pub const DEFAULT_CHUNK_SIZE: usize = 450;

/// Fanout engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FanoutConfig {
    /// Notifications written per atomic batch.
    pub chunk_size: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FanoutConfig {
    /// Create a config with a custom chunk size (validated on use).
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), FanoutError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_BATCH_WRITES {
            return Err(FanoutError::InvalidChunkSize {
                size: self.chunk_size,
                max: MAX_BATCH_WRITES,
            });
        }
        Ok(())
    }
}
