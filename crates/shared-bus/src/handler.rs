//! # Trigger Handlers
//!
//! A trigger handler reacts to changes of documents matching one path
//! pattern. Handlers are invoked independently per event and must tolerate
//! duplicate and out-of-order delivery.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::{ChangeKind, DocumentEvent};

/// Why a handler invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The event cannot ever be processed (missing author, self-follow).
    /// Logged and dropped.
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// The invocation may succeed if the event is delivered again.
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl HandlerError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A handler for document-change events on one path pattern.
#[async_trait]
pub trait TriggerHandler: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Path pattern such as `users/{uid}/followers/{followerId}`.
    fn pattern(&self) -> &'static str;

    /// Change kinds this handler is invoked for.
    fn kinds(&self) -> &'static [ChangeKind];

    /// Process one delivery of `event`.
    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError>;

    /// Whether this handler should see `event`.
    fn accepts(&self, event: &DocumentEvent) -> bool {
        self.kinds().contains(&event.kind) && event.path.match_pattern(self.pattern()).is_some()
    }
}
