//! # Shared Types Crate
//!
//! Identifiers, document paths and the document value model used by every
//! social-graph component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the logical collection layout
//!   (`users/{uid}/followers/{followerId}` and friends) is defined once, in
//!   [`paths`], and every component builds its paths from it.
//! - **Validated Identifiers**: a `UserId` or `PostId` can never contain a
//!   path separator, so a caller cannot address a document outside the
//!   collection it meant to write.

pub mod clock;
pub mod document;
pub mod entities;
pub mod errors;
pub mod paths;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use document::{CollectionPath, Document, DocumentPath};
pub use entities::{PostId, UserId};
pub use errors::*;
