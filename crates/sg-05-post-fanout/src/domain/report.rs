/// Outcome of one fanout invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    pub post_id: String,
    /// Followers in the snapshot read at the start of the invocation.
    pub followers: usize,
    /// Number of chunks the snapshot was split into.
    pub chunks: usize,
    /// Indices of chunks whose batch committed.
    pub committed_chunks: Vec<usize>,
    /// Indices of chunks whose batch failed.
    pub failed_chunks: Vec<usize>,
    /// Notification documents created or changed by committed chunks.
    pub written: usize,
}

impl FanoutReport {
    #[must_use]
    pub fn new(post_id: impl Into<String>, followers: usize, chunks: usize) -> Self {
        Self {
            post_id: post_id.into(),
            followers,
            chunks,
            committed_chunks: Vec::with_capacity(chunks),
            failed_chunks: Vec::new(),
            written: 0,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty() && self.committed_chunks.len() == self.chunks
    }
}
