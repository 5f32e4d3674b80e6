//! Service layer.

mod follow_request_machine;

pub use follow_request_machine::FollowRequestMachine;
