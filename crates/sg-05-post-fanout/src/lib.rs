//! # SG-05 Post Fanout
//!
//! Delivers one `new_post_{postId}` notification to every follower of an
//! author when a post becomes published.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): post normalisation, publish-transition
//!   detection, chunking, reports
//! - **Ports Layer** (`ports/`): `PostFanout`
//! - **Service Layer** (`service/`): `FanoutEngine`
//! - **Adapters Layer** (`adapters/`): trigger handlers for `posts/{postId}`
//!
//! ## Delivery
//!
//! ```text
//! followers(author) ──chunk(450)──→ [batch 0] [batch 1] ... [batch n]
//!                                       │         │             │
//!                                   commit    commit        commit    (independent)
//! ```
//!
//! A failed chunk does not undo earlier chunks and is not retried here: the
//! invocation fails and the whole fanout is redelivered. Every write is a
//! merge upsert keyed by `(postId, followerId)`, so re-running committed
//! chunks only refreshes the same documents.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{triggers, PostCreatedTrigger, PostUpdatedTrigger};
pub use config::FanoutConfig;
pub use domain::{chunk, is_published, publish_transition, FanoutError, FanoutReport, PostRecord};
pub use ports::PostFanout;
pub use service::FanoutEngine;
