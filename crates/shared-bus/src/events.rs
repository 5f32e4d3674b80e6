//! # Document Change Events
//!
//! Defines the events that flow through the shared bus. Every applied write
//! to the document store surfaces here as a created/updated/deleted event
//! carrying the before and after images of the document.
//!
//! Delivery is at-least-once: the same `event_id` may be seen several times
//! (with an increasing `delivery_attempt`), and no ordering is guaranteed
//! between events for different documents.

use serde::{Deserialize, Serialize};
use shared_types::{paths, Document, DocumentPath, Timestamp};
use uuid::Uuid;

/// What happened to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The document did not exist before this write.
    Created,
    /// An existing document changed.
    Updated,
    /// The document was removed.
    Deleted,
}

/// A document-change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvent {
    /// Stable id of the logical change; shared by all redeliveries.
    pub event_id: Uuid,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Path of the changed document.
    pub path: DocumentPath,
    /// Document before the change (absent for `Created`).
    pub before: Option<Document>,
    /// Document after the change (absent for `Deleted`).
    pub after: Option<Document>,
    /// When the change was applied.
    pub occurred_at: Timestamp,
    /// 1 for the first delivery, incremented on every redelivery.
    pub delivery_attempt: u32,
}

impl DocumentEvent {
    /// Event for a newly created document.
    #[must_use]
    pub fn created(path: DocumentPath, after: Document, occurred_at: Timestamp) -> Self {
        Self::new(ChangeKind::Created, path, None, Some(after), occurred_at)
    }

    /// Event for a changed document.
    #[must_use]
    pub fn updated(
        path: DocumentPath,
        before: Document,
        after: Document,
        occurred_at: Timestamp,
    ) -> Self {
        Self::new(ChangeKind::Updated, path, Some(before), Some(after), occurred_at)
    }

    /// Event for a removed document.
    #[must_use]
    pub fn deleted(path: DocumentPath, before: Document, occurred_at: Timestamp) -> Self {
        Self::new(ChangeKind::Deleted, path, Some(before), None, occurred_at)
    }

    fn new(
        kind: ChangeKind,
        path: DocumentPath,
        before: Option<Document>,
        after: Option<Document>,
        occurred_at: Timestamp,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            path,
            before,
            after,
            occurred_at,
            delivery_attempt: 1,
        }
    }

    /// The same logical event, scheduled for another delivery.
    #[must_use]
    pub fn redelivery(&self) -> Self {
        Self {
            delivery_attempt: self.delivery_attempt.saturating_add(1),
            ..self.clone()
        }
    }

    /// The topic this event is published under.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        EventTopic::for_path(&self.path)
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// `posts/{postId}`
    Posts,
    /// `users/{uid}/followers/{followerId}`
    Followers,
    /// `users/{uid}/following/{followeeId}`
    Following,
    /// `users/{followeeId}/follow_requests/{followerId}`
    FollowRequests,
    /// `users/{followerId}/follow_requests_sent/{followeeId}`
    SentRequests,
    /// `users/{uid}/notifications/{id}`
    Notifications,
    /// Anything else (profiles, unrelated collections).
    Other,
}

impl EventTopic {
    /// Classify a document path.
    #[must_use]
    pub fn for_path(path: &DocumentPath) -> Self {
        if path.segments().len() == 2 && path.collection_id() == paths::POSTS {
            return Self::Posts;
        }
        if path.segments().len() != 4 || path.segments()[0] != paths::USERS {
            return Self::Other;
        }
        match path.collection_id() {
            paths::FOLLOWERS => Self::Followers,
            paths::FOLLOWING => Self::Following,
            paths::FOLLOW_REQUESTS => Self::FollowRequests,
            paths::FOLLOW_REQUESTS_SENT => Self::SentRequests,
            paths::NOTIFICATIONS => Self::Notifications,
            _ => Self::Other,
        }
    }
}

/// Filter for subscribing to specific topics and change kinds.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty = all topics.
    pub topics: Vec<EventTopic>,
    /// Change kinds to include. Empty = all kinds.
    pub kinds: Vec<ChangeKind>,
}

impl EventFilter {
    /// Create a filter that matches all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            kinds: Vec::new(),
        }
    }

    /// Restrict the filter to the given change kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<ChangeKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &DocumentEvent) -> bool {
        (self.topics.is_empty() || self.topics.contains(&event.topic()))
            && (self.kinds.is_empty() || self.kinds.contains(&event.kind))
    }
}
