//! Domain layer for post fanout.

pub mod chunk;
pub mod errors;
pub mod post;
pub mod report;

pub use chunk::chunk;
pub use errors::FanoutError;
pub use post::{is_published, publish_transition, PostRecord, PUBLISHED};
pub use report::FanoutReport;
