mod triggers;

pub use triggers::{triggers, PostCreatedTrigger, PostUpdatedTrigger};
