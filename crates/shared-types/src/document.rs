//! # Document Model
//!
//! A document is a JSON object stored at a path of alternating
//! collection/document segments, e.g. `users/B/followers/F1`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::PathError;

/// Field map of a stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

fn split(raw: &str) -> Result<Vec<String>, PathError> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(PathError::EmptySegment(raw.to_string()));
    }
    Ok(segments)
}

/// Path of a single document (even number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Parse a slash separated document path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = split(raw)?;
        if segments.len() % 2 != 0 {
            return Err(PathError::NotADocument(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// All segments, collection and document ids interleaved.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The document id (last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        // A document path always has at least two segments.
        &self.segments[self.segments.len() - 1]
    }

    /// The collection this document lives in.
    #[must_use]
    pub fn collection(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// The collection id the document belongs to (e.g. `followers`).
    #[must_use]
    pub fn collection_id(&self) -> &str {
        &self.segments[self.segments.len() - 2]
    }

    /// Match this path against a pattern such as
    /// `users/{uid}/followers/{followerId}`.
    ///
    /// Returns the captured wildcard values in order, or `None` when the
    /// path does not match.
    #[must_use]
    pub fn match_pattern(&self, pattern: &str) -> Option<Vec<&str>> {
        let parts: Vec<&str> = pattern.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut captures = Vec::new();
        for (part, segment) in parts.iter().zip(&self.segments) {
            if part.starts_with('{') && part.ends_with('}') {
                captures.push(segment.as_str());
            } else if part != segment {
                return None;
            }
        }
        Some(captures)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl TryFrom<String> for DocumentPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentPath> for String {
    fn from(path: DocumentPath) -> Self {
        path.to_string()
    }
}

/// Path of a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        debug_assert!(segments.len() % 2 == 1);
        Self { segments }
    }

    /// Parse a slash separated collection path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = split(raw)?;
        if segments.len() % 2 != 1 {
            return Err(PathError::NotACollection(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// Path of the document `id` inside this collection.
    ///
    /// `id` must be a single segment; ids are validated at construction
    /// (`UserId`, `PostId`, notification keys), so this cannot fail for them.
    #[must_use]
    pub fn doc(&self, id: &str) -> DocumentPath {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        DocumentPath { segments }
    }

    /// Whether `path` is a direct child of this collection.
    #[must_use]
    pub fn contains(&self, path: &DocumentPath) -> bool {
        path.segments.len() == self.segments.len() + 1
            && path.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
