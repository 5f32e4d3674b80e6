//! # Shared Bus - Document Change Feed
//!
//! Carries document-change events from the store to the trigger handlers.
//! This is the in-process stand-in for the hosting platform's trigger
//! mechanism.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌────────────────┐   publish()   ┌──────────────┐  subscribe()  ┌──────────────┐
//! │ Document Store │ ────────────→ │  Event Bus   │ ────────────→ │ Trigger      │
//! │ (applied write)│               │              │ ←──────────── │ Router       │
//! └────────────────┘               └──────────────┘  redelivery   └──────────────┘
//! ```
//!
//! - **At-least-once:** an event may be delivered more than once; the
//!   router redelivers failed invocations with the same `event_id`.
//! - **No ordering:** nothing orders events for distinct documents, and
//!   redeliveries may overtake newer events for the same document.
//! - **Dead letters:** invocations that exhaust their attempts are logged
//!   under [`DLQ_TOPIC`].

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod handler;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ChangeKind, DocumentEvent, EventFilter, EventTopic};
pub use handler::{HandlerError, TriggerHandler};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Dead Letter Queue topic for invocations that exhausted their attempts.
pub const DLQ_TOPIC: &str = "dlq.triggers";
