//! # Error Types
//!
//! Defines error types used across components.

use thiserror::Error;

/// Errors raised when constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only.
    #[error("{kind} id must not be empty")]
    Empty { kind: &'static str },

    /// The identifier contained a path separator.
    #[error("{kind} id {value:?} must not contain '/'")]
    ContainsSeparator { kind: &'static str, value: String },
}

/// Errors raised when parsing a document or collection path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path had no segments.
    #[error("path is empty")]
    Empty,

    /// A segment between two separators was empty.
    #[error("path {0:?} contains an empty segment")]
    EmptySegment(String),

    /// A document path must have an even number of segments.
    #[error("path {0:?} does not address a document")]
    NotADocument(String),

    /// A collection path must have an odd number of segments.
    #[error("path {0:?} does not address a collection")]
    NotACollection(String),
}
