//! Domain layer: edges, their stored records and errors.

mod edge;
mod errors;

pub use edge::{edge_pair_ops, EdgeRecord, EdgeSource, FollowEdge, ReconcileReport};
pub use errors::RelationshipError;
