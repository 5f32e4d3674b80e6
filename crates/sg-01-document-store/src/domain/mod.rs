//! Domain layer: write semantics, batches and transactions.

mod codec;
mod errors;
mod transaction;
mod write;

pub use codec::{decode, encode};
pub use errors::StoreError;
pub use transaction::{Transaction, TransactionConfig, Versioned};
pub use write::{merge_fields, CommitSummary, Resolution, WriteBatch, WriteOp, MAX_BATCH_WRITES};
