//! # SG-01 Document Store
//!
//! The only shared resource between handler invocations. Every component
//! coordinates exclusively through the writes defined here.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): write operations and their pure merge
//!   semantics, batches, transactions, errors
//! - **Ports Layer** (`ports/`): `DocumentStore`, the driving port every
//!   other subsystem talks to
//! - **Service Layer** (`service/`): `run_transaction`, the optimistic
//!   retry loop
//! - **Adapters Layer** (`adapters/`): `InMemoryDocumentStore` with an
//!   optional change feed and fault injection
//!
//! ## Write Semantics
//!
//! - `Upsert` merges fields into the document and only writes when the
//!   merged result differs from what is stored. `defaults` are applied only
//!   when the document is created.
//! - `CreateIfAbsent` never touches an existing document.
//! - `Delete` of an absent document is a no-op.
//! - A `WriteBatch` holds at most [`MAX_BATCH_WRITES`] operations and
//!   commits all-or-nothing.
//! - A `Transaction` additionally records the version of every document it
//!   read; commit fails with `StoreError::Contention` when any of them
//!   changed in the meantime.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{Fault, InMemoryDocumentStore};
pub use domain::{
    decode, encode, merge_fields, CommitSummary, Resolution, StoreError, Transaction,
    TransactionConfig, Versioned, WriteBatch, WriteOp, MAX_BATCH_WRITES,
};
pub use ports::DocumentStore;
pub use service::run_transaction;
