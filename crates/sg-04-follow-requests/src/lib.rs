//! # SG-04 Follow Requests
//!
//! Connection requests between users and the follower/following edges they
//! produce.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): request records, statuses, per-account
//!   follow policy, tagged outcomes
//! - **Ports Layer** (`ports/`): `FollowApi` for client actions
//! - **Service Layer** (`service/`): `FollowRequestMachine`
//! - **Adapters Layer** (`adapters/`): trigger handlers for request and
//!   follower documents
//!
//! ## Documents
//!
//! | Path | Role |
//! |------|------|
//! | `users/{followeeId}/follow_requests/{followerId}` | primary request |
//! | `users/{followerId}/follow_requests_sent/{followeeId}` | requester's mirror |
//! | `users/{uid}.requiresFollowApproval` | `false` opts into instant follows |
//!
//! ## Guarantees
//!
//! - A user can never request, follow or be followed by themselves.
//! - After an accepted request both edge mirrors exist and neither request
//!   document does; after a declined request no edge exists and neither
//!   request document does. Both are applied in one transaction.
//! - The requester's notification is sent after the transaction commits and
//!   its failure never undoes the transition.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    triggers, FollowerCreatedTrigger, RequestCreatedTrigger, RequestDeletedTrigger,
    RequestUpdatedTrigger,
};
pub use config::FollowConfig;
pub use domain::{
    Decision, FollowError, FollowMode, FollowOutcome, FollowRequest, IgnoreReason, InstantFollow,
    RequestOutcome, RequestStatus, Transition,
};
pub use ports::FollowApi;
pub use service::FollowRequestMachine;
