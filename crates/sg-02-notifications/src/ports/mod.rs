//! Ports layer.

mod inbound;

pub use inbound::{Delivery, UpsertByKey};
