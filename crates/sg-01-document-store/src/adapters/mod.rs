//! Adapters layer.

mod memory;

pub use memory::{Fault, InMemoryDocumentStore};
