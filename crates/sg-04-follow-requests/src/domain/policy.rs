//! Per-account follow policy.

use serde_json::Value;
use shared_types::Document;

/// Profile field that gates follows behind a request.
pub const REQUIRES_APPROVAL_FIELD: &str = "requiresFollowApproval";

/// How a follow of an account is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowMode {
    /// A follow creates a pending request the followee must answer.
    RequiresApproval,
    /// A follow creates the edge pair directly.
    Instant,
}

impl FollowMode {
    /// Read the mode from a `users/{uid}` profile.
    ///
    /// A missing profile or field requires approval.
    #[must_use]
    pub fn from_profile(profile: Option<&Document>) -> Self {
        match profile
            .and_then(|p| p.get(REQUIRES_APPROVAL_FIELD))
            .and_then(Value::as_bool)
        {
            Some(false) => Self::Instant,
            _ => Self::RequiresApproval,
        }
    }
}
