//! Notification payloads and the stored record.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sg_01_document_store::WriteOp;
use shared_types::{paths, Document, PostId, Timestamp, UserId};

use super::key::{NotificationKey, NotificationKind};

/// Display fields of the user a notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorDisplay {
    pub id: UserId,
    pub name: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<String>,
}

impl ActorDisplay {
    /// Actor known only by id.
    #[must_use]
    pub fn bare(id: UserId) -> Self {
        Self {
            id,
            name: None,
            role: None,
            avatar: None,
        }
    }

    /// Read display fields from a `users/{uid}` profile document.
    #[must_use]
    pub fn from_profile(id: UserId, profile: Option<&Document>) -> Self {
        let text = |keys: &[&str]| {
            profile.and_then(|p| {
                keys.iter()
                    .filter_map(|k| p.get(*k).and_then(Value::as_str))
                    .map(str::trim)
                    .find(|s| !s.is_empty())
                    .map(str::to_string)
            })
        };
        Self {
            name: text(&["displayName", "name", "fullName"]),
            role: text(&["role"]),
            avatar: text(&["avatar", "photoURL", "photoUrl"]),
            id,
        }
    }

    /// Name to show in notification text.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Someone")
    }

    fn write_fields(&self, prefix: &str, fields: &mut Document) {
        fields.insert(format!("{prefix}Id"), json!(self.id.as_str()));
        if let Some(name) = &self.name {
            fields.insert(format!("{prefix}Name"), json!(name));
        }
        if let Some(role) = &self.role {
            fields.insert(format!("{prefix}Role"), json!(role));
        }
        if let Some(avatar) = &self.avatar {
            fields.insert(format!("{prefix}Avatar"), json!(avatar));
        }
    }
}

/// Content of a notification, before it is keyed and written.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    /// Type-specific fields (`postId`, `authorId`, `followerName`, ...).
    pub extra: Document,
}

impl NotificationDraft {
    /// A followed author published a post.
    #[must_use]
    pub fn new_post(post_id: &PostId, author: &ActorDisplay, post_title: Option<&str>) -> Self {
        let mut extra = Document::new();
        extra.insert("postId".into(), json!(post_id.as_str()));
        author.write_fields("author", &mut extra);
        let body = match post_title {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => format!("{} published a new post", author.display_name()),
        };
        Self {
            kind: NotificationKind::NewPost,
            title: format!("New post from {}", author.display_name()),
            body,
            link: Some(format!("/posts/{post_id}")),
            extra,
        }
    }

    /// Someone started following the recipient.
    #[must_use]
    pub fn follow(follower: &ActorDisplay) -> Self {
        let mut extra = Document::new();
        follower.write_fields("follower", &mut extra);
        Self {
            kind: NotificationKind::Follow,
            title: "New follower".into(),
            body: format!("{} started following you", follower.display_name()),
            link: Some(format!("/profile/{}", follower.id)),
            extra,
        }
    }

    /// Someone asked to follow the recipient.
    #[must_use]
    pub fn follow_request(follower: &ActorDisplay) -> Self {
        let mut extra = Document::new();
        follower.write_fields("follower", &mut extra);
        Self {
            kind: NotificationKind::FollowRequest,
            title: "New follow request".into(),
            body: format!("{} wants to follow you", follower.display_name()),
            link: Some("/connections/requests".into()),
            extra,
        }
    }

    /// The recipient's request was accepted by `followee`.
    #[must_use]
    pub fn follow_request_accepted(followee: &ActorDisplay) -> Self {
        let mut extra = Document::new();
        followee.write_fields("followee", &mut extra);
        Self {
            kind: NotificationKind::FollowRequestAccepted,
            title: "Follow request accepted".into(),
            body: format!("{} accepted your follow request", followee.display_name()),
            link: Some(format!("/profile/{}", followee.id)),
            extra,
        }
    }

    /// The recipient's request was declined by `followee`.
    #[must_use]
    pub fn follow_request_declined(followee: &ActorDisplay) -> Self {
        let mut extra = Document::new();
        followee.write_fields("followee", &mut extra);
        Self {
            kind: NotificationKind::FollowRequestDeclined,
            title: "Follow request declined".into(),
            body: format!("{} declined your follow request", followee.display_name()),
            link: None,
            extra,
        }
    }

    /// Fields refreshed on every delivery.
    #[must_use]
    pub fn fields(&self) -> Document {
        let mut fields = self.extra.clone();
        fields.insert("type".into(), json!(self.kind));
        fields.insert("title".into(), json!(self.title));
        fields.insert("body".into(), json!(self.body));
        if let Some(link) = &self.link {
            fields.insert("link".into(), json!(link));
        }
        fields
    }
}

/// Fields written only when the notification is first created.
///
/// Recipient state (`seen`, `readAt`) is never reset by a redelivery.
#[must_use]
pub fn insert_only_defaults(created_at: Timestamp) -> Document {
    let mut defaults = Document::new();
    defaults.insert("seen".into(), json!(false));
    defaults.insert("readAt".into(), Value::Null);
    defaults.insert("createdAt".into(), json!(created_at));
    defaults
}

/// The idempotent write for one notification.
///
/// Keyed by `key` under the recipient and written with merge semantics, so
/// any number of repetitions leaves exactly one document.
#[must_use]
pub fn upsert_op(
    recipient: &UserId,
    key: &NotificationKey,
    draft: &NotificationDraft,
    now: Timestamp,
) -> WriteOp {
    WriteOp::upsert_with_defaults(
        paths::notifications(recipient).doc(key.as_str()),
        draft.fields(),
        insert_only_defaults(now),
    )
}

/// A stored notification as seen by its recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Document id (the notification key).
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
    pub seen: bool,
    #[serde(default)]
    pub read_at: Option<Timestamp>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    /// Type-specific actor and entity fields.
    #[serde(flatten)]
    pub extra: Document,
}
