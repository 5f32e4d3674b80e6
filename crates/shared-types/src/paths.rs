//! # Collection Layout
//!
//! Logical document paths used by the connection flow:
//!
//! ```text
//! users/{uid}
//! users/{uid}/followers/{followerId}            "who follows me"
//! users/{uid}/following/{followeeId}            "who I follow"
//! users/{followeeId}/follow_requests/{followerId}       request (primary)
//! users/{followerId}/follow_requests_sent/{followeeId}  request (mirror)
//! users/{uid}/notifications/{deterministicId}
//! posts/{postId}
//! ```

use crate::document::{CollectionPath, DocumentPath};
use crate::entities::{PostId, UserId};

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const FOLLOWERS: &str = "followers";
pub const FOLLOWING: &str = "following";
pub const FOLLOW_REQUESTS: &str = "follow_requests";
pub const FOLLOW_REQUESTS_SENT: &str = "follow_requests_sent";
pub const NOTIFICATIONS: &str = "notifications";

/// Trigger pattern: a post document.
pub const POST_PATTERN: &str = "posts/{postId}";
/// Trigger pattern: a followee-side follower record.
pub const FOLLOWER_PATTERN: &str = "users/{uid}/followers/{followerId}";
/// Trigger pattern: a primary follow request.
pub const FOLLOW_REQUEST_PATTERN: &str = "users/{followeeId}/follow_requests/{followerId}";

fn user_sub(uid: &UserId, collection: &str) -> CollectionPath {
    CollectionPath::from_segments(vec![
        USERS.to_string(),
        uid.to_string(),
        collection.to_string(),
    ])
}

/// `users/{uid}`
#[must_use]
pub fn user(uid: &UserId) -> DocumentPath {
    CollectionPath::from_segments(vec![USERS.to_string()]).doc(uid.as_str())
}

/// `users/{uid}/followers`
#[must_use]
pub fn followers(uid: &UserId) -> CollectionPath {
    user_sub(uid, FOLLOWERS)
}

/// `users/{uid}/followers/{followerId}`
#[must_use]
pub fn follower(uid: &UserId, follower_id: &UserId) -> DocumentPath {
    followers(uid).doc(follower_id.as_str())
}

/// `users/{uid}/following`
#[must_use]
pub fn following(uid: &UserId) -> CollectionPath {
    user_sub(uid, FOLLOWING)
}

/// `users/{uid}/following/{followeeId}`
#[must_use]
pub fn followee(uid: &UserId, followee_id: &UserId) -> DocumentPath {
    following(uid).doc(followee_id.as_str())
}

/// `users/{followeeId}/follow_requests`
#[must_use]
pub fn follow_requests(followee_id: &UserId) -> CollectionPath {
    user_sub(followee_id, FOLLOW_REQUESTS)
}

/// `users/{followeeId}/follow_requests/{followerId}`
#[must_use]
pub fn follow_request(followee_id: &UserId, follower_id: &UserId) -> DocumentPath {
    follow_requests(followee_id).doc(follower_id.as_str())
}

/// `users/{followerId}/follow_requests_sent`
#[must_use]
pub fn sent_requests(follower_id: &UserId) -> CollectionPath {
    user_sub(follower_id, FOLLOW_REQUESTS_SENT)
}

/// `users/{followerId}/follow_requests_sent/{followeeId}`
#[must_use]
pub fn sent_request(follower_id: &UserId, followee_id: &UserId) -> DocumentPath {
    sent_requests(follower_id).doc(followee_id.as_str())
}

/// `users/{uid}/notifications`
#[must_use]
pub fn notifications(uid: &UserId) -> CollectionPath {
    user_sub(uid, NOTIFICATIONS)
}

/// `posts`
#[must_use]
pub fn posts() -> CollectionPath {
    CollectionPath::from_segments(vec![POSTS.to_string()])
}

/// `posts/{postId}`
#[must_use]
pub fn post(post_id: &PostId) -> DocumentPath {
    posts().doc(post_id.as_str())
}
