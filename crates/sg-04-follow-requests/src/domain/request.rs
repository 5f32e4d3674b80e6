//! Follow request records.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sg_03_relationships::FollowEdge;
use shared_types::{paths, Document, DocumentPath, Timestamp, UserId};

/// Lifecycle state stored in the request's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// The decision this status records, if it is terminal.
    #[must_use]
    pub fn decision(&self) -> Option<Decision> {
        match self {
            Self::Pending => None,
            Self::Accepted => Some(Decision::Accepted),
            Self::Declined => Some(Decision::Declined),
        }
    }

    /// Read the status of a stored request document.
    #[must_use]
    pub fn of(document: &Document) -> Option<Self> {
        match document.get("status").and_then(Value::as_str)? {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// The followee's answer to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accepted,
    Declined,
}

impl Decision {
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        match self {
            Self::Accepted => RequestStatus::Accepted,
            Self::Declined => RequestStatus::Declined,
        }
    }
}

/// A stored follow request (primary or mirror).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub requester_id: UserId,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// `users/{followee}/follow_requests/{follower}`
#[must_use]
pub fn request_path(pair: &FollowEdge) -> DocumentPath {
    paths::follow_request(pair.followee(), pair.follower())
}

/// `users/{follower}/follow_requests_sent/{followee}`
#[must_use]
pub fn sent_request_path(pair: &FollowEdge) -> DocumentPath {
    paths::sent_request(pair.follower(), pair.followee())
}

/// Fields asserted by every `create`; re-asserting them is a no-op.
#[must_use]
pub fn pending_fields(pair: &FollowEdge) -> Document {
    let mut fields = Document::new();
    fields.insert("followerId".into(), json!(pair.follower().as_str()));
    fields.insert("followeeId".into(), json!(pair.followee().as_str()));
    fields.insert("requesterId".into(), json!(pair.follower().as_str()));
    fields.insert("status".into(), json!(RequestStatus::Pending));
    fields
}

/// Fields written only when the request is first created.
///
/// Answered requests are deleted, so a request never records when it was
/// answered; the edge's `createdAt` does.
#[must_use]
pub fn creation_defaults(now: Timestamp) -> Document {
    let mut defaults = Document::new();
    defaults.insert("createdAt".into(), json!(now));
    defaults
}
