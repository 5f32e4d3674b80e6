//! Tagged results of follow operations.
//!
//! A committed transition and the best-effort notification that follows it
//! are reported separately: `Err` means the transition itself failed, while
//! `Transition::Committed { notification: Delivery::Failed(_), .. }` means
//! the relationship change is durable and only the notification is missing.

use sg_02_notifications::Delivery;

use super::request::{Decision, RequestStatus};

/// Result of `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A pending request exists (newly written or re-asserted).
    Requested,
    /// The follower already follows the followee; nothing was written.
    AlreadyFollowing,
}

/// Result of `follow`, which picks a request or an instant follow from the
/// followee's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Requested,
    Followed,
    AlreadyFollowing,
}

/// Why a respond or trigger invocation had nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The stored status already equals the requested decision.
    AlreadyInState(RequestStatus),
    /// No request exists: already processed or cancelled.
    RequestMissing,
    /// The stored request carries the opposite decision.
    Superseded(RequestStatus),
    /// The stored request does not carry the decision in the event: the
    /// event is stale or arrived ahead of its write.
    Unanswered,
    /// The change did not move the request to a terminal status.
    NotTerminal,
}

/// Result of applying a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The transaction committed; `notification` reports phase two.
    Committed {
        decision: Decision,
        notification: Delivery,
    },
    /// Nothing was written.
    Ignored(IgnoreReason),
}

impl Transition {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Result of the follower-created trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantFollow {
    /// The following-side mirror had to be created.
    pub mirror_restored: bool,
    /// `None` for edges created by an accepted request, which are announced
    /// by `follow_request_accepted` instead.
    pub notification: Option<Delivery>,
}
