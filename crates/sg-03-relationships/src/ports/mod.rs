//! Ports layer.

mod inbound;

pub use inbound::RelationshipReader;
