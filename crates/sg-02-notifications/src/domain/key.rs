//! Notification kinds and deterministic keys.

use serde::{Deserialize, Serialize};
use shared_types::{PostId, UserId};
use std::fmt;

use super::errors::NotificationError;

/// Notification type, stored as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewPost,
    Follow,
    FollowRequest,
    FollowRequestAccepted,
    FollowRequestDeclined,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewPost => "new_post",
            Self::Follow => "follow",
            Self::FollowRequest => "follow_request",
            Self::FollowRequestAccepted => "follow_request_accepted",
            Self::FollowRequestDeclined => "follow_request_declined",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document id of a notification under its recipient.
///
/// Derived purely from the identity of the logical event, so repeating the
/// event always targets the same document. Follow keys put the followee
/// before the follower.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationKey(String);

impl NotificationKey {
    /// `new_post_{postId}`
    #[must_use]
    pub fn new_post(post_id: &PostId) -> Self {
        Self(format!("{}_{}", NotificationKind::NewPost, post_id))
    }

    /// `follow_{followeeId}_{followerId}`
    #[must_use]
    pub fn follow(followee_id: &UserId, follower_id: &UserId) -> Self {
        Self::pair(NotificationKind::Follow, followee_id, follower_id)
    }

    /// `follow_request_{followeeId}_{followerId}`
    #[must_use]
    pub fn follow_request(followee_id: &UserId, follower_id: &UserId) -> Self {
        Self::pair(NotificationKind::FollowRequest, followee_id, follower_id)
    }

    /// `follow_request_accepted_{followeeId}_{followerId}`
    #[must_use]
    pub fn follow_request_accepted(followee_id: &UserId, follower_id: &UserId) -> Self {
        Self::pair(NotificationKind::FollowRequestAccepted, followee_id, follower_id)
    }

    /// `follow_request_declined_{followeeId}_{followerId}`
    #[must_use]
    pub fn follow_request_declined(followee_id: &UserId, follower_id: &UserId) -> Self {
        Self::pair(NotificationKind::FollowRequestDeclined, followee_id, follower_id)
    }

    fn pair(kind: NotificationKind, followee_id: &UserId, follower_id: &UserId) -> Self {
        Self(format!("{kind}_{followee_id}_{follower_id}"))
    }

    /// Accept a key received from a client (e.g. to mark it seen).
    pub fn parse(raw: &str) -> Result<Self, NotificationError> {
        if raw.trim().is_empty() || raw.contains('/') {
            return Err(NotificationError::InvalidKey(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
