//! # Event Wiring
//!
//! Connects the store's change feed to the trigger handlers of every
//! subsystem.
//!
//! ```text
//! Document Store ──DocumentEvent──→ Event Bus ──→ TriggerRouter
//!                                                    │
//!                      ┌─────────────────┬───────────┴───────┬──────────────────┐
//!                      ▼                 ▼                   ▼                  ▼
//!                 post_created      post_updated     follow_request_*   follower_created
//!                 (sg-05)           (sg-05)          (sg-04)            (sg-04)
//! ```

pub mod router;

pub use router::{InvocationOutcome, TriggerRouter};
