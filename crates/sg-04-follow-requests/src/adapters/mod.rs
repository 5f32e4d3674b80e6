//! Adapters layer.

mod triggers;

pub use triggers::{
    triggers, FollowerCreatedTrigger, RequestCreatedTrigger, RequestDeletedTrigger,
    RequestUpdatedTrigger,
};
