//! Driving port: the idempotent notification write.

use async_trait::async_trait;
use shared_types::UserId;
use tracing::{debug, warn};

use crate::domain::{NotificationDraft, NotificationError, NotificationKey};

/// Result of a best-effort notification write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The notification document exists with the current content.
    Delivered,
    /// The write failed and was swallowed.
    Failed(NotificationError),
}

impl Delivery {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Write a notification keyed by a deterministic id, with merge semantics.
#[async_trait]
pub trait UpsertByKey: Send + Sync {
    /// Create or refresh the notification `key` under `recipient`.
    async fn upsert_by_key(
        &self,
        recipient: &UserId,
        key: &NotificationKey,
        draft: &NotificationDraft,
    ) -> Result<(), NotificationError>;

    /// Best-effort variant: failures are logged and returned as
    /// [`Delivery::Failed`], never as an error.
    async fn deliver(
        &self,
        recipient: &UserId,
        key: &NotificationKey,
        draft: &NotificationDraft,
    ) -> Delivery {
        match self.upsert_by_key(recipient, key, draft).await {
            Ok(()) => {
                debug!(recipient = %recipient, key = %key, "Notification delivered");
                Delivery::Delivered
            }
            Err(e) => {
                warn!(
                    recipient = %recipient,
                    key = %key,
                    error = %e,
                    "Best-effort notification failed"
                );
                Delivery::Failed(e)
            }
        }
    }
}
