//! # SG-02 Notifications
//!
//! Per-user notification records under `users/{uid}/notifications/{key}`.
//!
//! ## Idempotency
//!
//! Every notification is written through [`UpsertByKey`]: the document id
//! is a [`NotificationKey`] computed from the identity of the logical event
//! (`new_post_{postId}`, `follow_{followeeId}_{followerId}`, ...) and the
//! write merges rather than inserts. Repeating the same event any number of
//! times leaves exactly one document; its content may be refreshed but
//! `seen` and `readAt` are only ever changed by the recipient.
//!
//! ## Best-effort delivery
//!
//! Notifications that follow an authoritative state change are delivered
//! with [`UpsertByKey::deliver`], which never fails: a store error is
//! logged and reported as [`Delivery::Failed`] so the caller can tell a
//! committed change with a missing notification apart from a failed change.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    insert_only_defaults, upsert_op, ActorDisplay, Notification, NotificationDraft,
    NotificationError, NotificationKey, NotificationKind,
};
pub use ports::{Delivery, UpsertByKey};
pub use service::NotificationService;
