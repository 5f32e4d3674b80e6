use async_trait::async_trait;

use crate::domain::{FanoutError, FanoutReport, PostRecord};

/// Broadcast of a published post to the author's followers.
#[async_trait]
pub trait PostFanout: Send + Sync {
    /// Upsert `new_post_{postId}` for every current follower of the author.
    ///
    /// Safe to repeat: a second run leaves the same set of documents.
    async fn fanout(&self, post: &PostRecord) -> Result<FanoutReport, FanoutError>;
}
