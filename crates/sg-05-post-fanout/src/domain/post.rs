//! Canonical post record and publish detection.
//!
//! Posts are written by several authoring screens that disagree on field
//! names. [`PostRecord::normalize`] maps every known shape onto one record;
//! nothing past this module looks at raw post fields.

use serde_json::Value;
use sg_02_notifications::ActorDisplay;
use shared_types::{Document, PostId, UserId};

use super::errors::FanoutError;

/// Status value that makes a post visible to followers.
pub const PUBLISHED: &str = "published";

const AUTHOR_ID: &[&str] = &["authorId", "authorUid", "userId", "uid", "createdBy", "author.id"];
const AUTHOR_NAME: &[&str] = &["authorName", "displayName", "userName", "author.name", "name"];
const AUTHOR_ROLE: &[&str] = &["authorRole", "role", "userRole", "author.role"];
const AUTHOR_AVATAR: &[&str] = &["authorAvatar", "authorPhotoURL", "author.avatar", "author.photoURL"];
const TITLE: &[&str] = &["title", "heading"];

/// A post as the fanout engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: PostId,
    pub author: ActorDisplay,
    pub title: Option<String>,
    pub published: bool,
}

impl PostRecord {
    /// Build the canonical record from a raw `posts/{postId}` document.
    ///
    /// Fails if no alias yields a usable author id.
    pub fn normalize(id: PostId, document: &Document) -> Result<Self, FanoutError> {
        let malformed = |reason: String| FanoutError::MalformedPost {
            post_id: id.to_string(),
            reason,
        };
        let raw_author = first_text(document, AUTHOR_ID)
            .ok_or_else(|| malformed("no author id".into()))?;
        let author_id = UserId::new(raw_author).map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            author: ActorDisplay {
                id: author_id,
                name: first_text(document, AUTHOR_NAME),
                role: first_text(document, AUTHOR_ROLE),
                avatar: first_text(document, AUTHOR_AVATAR),
            },
            title: first_text(document, TITLE),
            published: is_published(Some(document)),
            id,
        })
    }
}

/// Whether a post image carries the published status.
#[must_use]
pub fn is_published(document: Option<&Document>) -> bool {
    document
        .and_then(|d| d.get("status"))
        .and_then(Value::as_str)
        .is_some_and(|s| s.trim().eq_ignore_ascii_case(PUBLISHED))
}

/// "Was not published before, is published now."
///
/// `before` is `None` for a newly created post.
#[must_use]
pub fn publish_transition(before: Option<&Document>, after: &Document) -> bool {
    !is_published(before) && is_published(Some(after))
}

/// First non-blank string among `keys`; a dotted key reads a nested field.
fn first_text(document: &Document, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(document, key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn lookup<'a>(document: &'a Document, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut value = document.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}
