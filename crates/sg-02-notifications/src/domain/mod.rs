//! Domain layer: kinds, keys, payloads.

mod errors;
mod key;
mod notification;

pub use errors::NotificationError;
pub use key::{NotificationKey, NotificationKind};
pub use notification::{
    insert_only_defaults, upsert_op, ActorDisplay, Notification, NotificationDraft,
};
