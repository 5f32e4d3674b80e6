//! # SG-03 Relationships
//!
//! A follow edge `(followerId, followeeId)` is stored twice:
//!
//! - `users/{followeeId}/followers/{followerId}`: who follows me
//! - `users/{followerId}/following/{followeeId}`: who I follow
//!
//! Both mirrors are written and removed in the same atomic unit. Where a
//! mirror still goes missing (a partially replayed event, a manual edit),
//! [`RelationshipStore::ensure_mirror`] and [`RelationshipStore::reconcile`]
//! restore the pair. Self-edges are rejected at construction of
//! [`FollowEdge`].

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    edge_pair_ops, EdgeRecord, EdgeSource, FollowEdge, ReconcileReport, RelationshipError,
};
pub use ports::RelationshipReader;
pub use service::RelationshipStore;
