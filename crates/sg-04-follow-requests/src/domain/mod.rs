//! Domain layer: request records, policy, outcomes.

mod errors;
mod outcome;
mod policy;
mod request;

pub use errors::FollowError;
pub use outcome::{FollowOutcome, IgnoreReason, InstantFollow, RequestOutcome, Transition};
pub use policy::{FollowMode, REQUIRES_APPROVAL_FIELD};
pub use request::{
    creation_defaults, pending_fields, request_path, sent_request_path, Decision, FollowRequest,
    RequestStatus,
};
