//! Driving port: client-initiated follow operations.

use async_trait::async_trait;
use shared_types::UserId;

use crate::domain::{Decision, FollowError, FollowOutcome, FollowRequest, RequestOutcome, Transition};

/// Follow operations exposed to clients.
#[async_trait]
pub trait FollowApi: Send + Sync {
    /// Ask to follow `followee`. Repeated calls re-assert the same request.
    async fn create(&self, follower: &UserId, followee: &UserId) -> Result<RequestOutcome, FollowError>;

    /// Withdraw a request. No-op if it does not exist.
    async fn cancel(&self, follower: &UserId, followee: &UserId) -> Result<(), FollowError>;

    /// Answer a request addressed to `followee`.
    async fn respond(
        &self,
        followee: &UserId,
        follower: &UserId,
        decision: Decision,
    ) -> Result<Transition, FollowError>;

    /// Follow `followee`, as a request or directly depending on their policy.
    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<FollowOutcome, FollowError>;

    /// Pending requests addressed to `followee`.
    async fn incoming(&self, followee: &UserId) -> Result<Vec<FollowRequest>, FollowError>;

    /// Requests sent by `follower` that are still open.
    async fn outgoing(&self, follower: &UserId) -> Result<Vec<FollowRequest>, FollowError>;
}
