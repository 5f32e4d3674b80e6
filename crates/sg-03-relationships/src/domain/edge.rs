//! Follow edges.

use serde::{Deserialize, Serialize};
use sg_01_document_store::{encode, StoreError, WriteOp};
use shared_types::{paths, DocumentPath, Timestamp, UserId};

use super::errors::RelationshipError;

/// A directed relationship: `follower` follows `followee`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowEdge {
    follower: UserId,
    followee: UserId,
}

impl FollowEdge {
    /// Rejects self-edges.
    pub fn new(follower: UserId, followee: UserId) -> Result<Self, RelationshipError> {
        if follower == followee {
            return Err(RelationshipError::SelfRelationship(follower));
        }
        Ok(Self { follower, followee })
    }

    #[must_use]
    pub fn follower(&self) -> &UserId {
        &self.follower
    }

    #[must_use]
    pub fn followee(&self) -> &UserId {
        &self.followee
    }

    /// `users/{followee}/followers/{follower}`
    #[must_use]
    pub fn follower_path(&self) -> DocumentPath {
        paths::follower(&self.followee, &self.follower)
    }

    /// `users/{follower}/following/{followee}`
    #[must_use]
    pub fn following_path(&self) -> DocumentPath {
        paths::followee(&self.follower, &self.followee)
    }
}

/// How an edge came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSource {
    /// Created by accepting a follow request.
    Request,
    /// Created directly, without an approval step.
    Direct,
}

/// Stored content of either mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub follower_id: UserId,
    pub followee_id: UserId,
    /// Edges written before sources were recorded count as direct.
    #[serde(default = "EdgeRecord::legacy_source")]
    pub source: EdgeSource,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl EdgeRecord {
    #[must_use]
    pub fn new(edge: &FollowEdge, source: EdgeSource, created_at: Timestamp) -> Self {
        Self {
            follower_id: edge.follower.clone(),
            followee_id: edge.followee.clone(),
            source,
            created_at: Some(created_at),
        }
    }

    fn legacy_source() -> EdgeSource {
        EdgeSource::Direct
    }
}

/// Create-if-absent writes for both mirrors of `edge`.
///
/// Safe to re-run: an existing mirror is left untouched.
pub fn edge_pair_ops(
    edge: &FollowEdge,
    source: EdgeSource,
    now: Timestamp,
) -> Result<[WriteOp; 2], StoreError> {
    let record = EdgeRecord::new(edge, source, now);
    let follower_path = edge.follower_path();
    let following_path = edge.following_path();
    let follower_doc = encode(&follower_path, &record)?;
    let following_doc = encode(&following_path, &record)?;
    Ok([
        WriteOp::create_if_absent(follower_path, follower_doc),
        WriteOp::create_if_absent(following_path, following_doc),
    ])
}

/// Outcome of [`crate::RelationshipStore::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub followers_checked: usize,
    pub following_checked: usize,
    pub mirrors_restored: usize,
}
