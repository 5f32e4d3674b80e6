use async_trait::async_trait;
use shared_types::UserId;

use crate::domain::RelationshipError;

/// Read side of the relationship store.
#[async_trait]
pub trait RelationshipReader: Send + Sync {
    /// Ids of everyone following `uid` (point-in-time snapshot).
    async fn follower_ids(&self, uid: &UserId) -> Result<Vec<UserId>, RelationshipError>;

    /// Ids of everyone `uid` follows.
    async fn following_ids(&self, uid: &UserId) -> Result<Vec<UserId>, RelationshipError>;

    /// Whether `follower` follows `followee` (followee-side mirror).
    async fn is_following(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, RelationshipError>;
}
