//! Error types for kinship operations.
//!
//! Every graph operation returns [`Result`]. Variants carry the ids they
//! concern so callers can surface them to an API or UI boundary unchanged.
//! [`Error::kind`] collapses the variants onto the coarse taxonomy callers
//! usually branch on.

use crate::domain::{PersonId, ScopeId};
use std::io;
use thiserror::Error;

/// The error type for kinship operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No person with this id exists in the store.
    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    /// The requested edge is not present on both endpoints.
    #[error("Relationship not found: {from} -> {to}")]
    RelationshipNotFound {
        /// First endpoint (the parent for parent/child edges)
        from: PersonId,
        /// Second endpoint
        to: PersonId,
    },

    /// An initial parent passed to `add_person` was rejected.
    #[error("Invalid parent {parent}: {reason}")]
    InvalidParent {
        /// The offending parent id
        parent: PersonId,
        /// Why it was rejected
        reason: String,
    },

    /// Both endpoints of an edge are the same person.
    #[error("A person cannot be related to themselves: {0}")]
    IdenticalPerson(PersonId),

    /// The edge already exists.
    #[error("Relationship already exists: {from} -> {to}")]
    DuplicateRelationship {
        /// First endpoint
        from: PersonId,
        /// Second endpoint
        to: PersonId,
    },

    /// The endpoints belong to different family trees.
    #[error("Scope mismatch: {from} is in '{from_scope}', {to} is in '{to_scope}'")]
    ScopeMismatch {
        /// First endpoint
        from: PersonId,
        /// Scope of the first endpoint
        from_scope: ScopeId,
        /// Second endpoint
        to: PersonId,
        /// Scope of the second endpoint
        to_scope: ScopeId,
    },

    /// The scope contains no persons.
    #[error("Family tree '{0}' has no members")]
    EmptyScope(ScopeId),

    /// `remove_person` could not clean every neighbor; the record was kept.
    #[error("Could not remove {person}: {} neighbor(s) still reference it", pending.len())]
    PartialCleanupFailure {
        /// The person whose removal was attempted
        person: PersonId,
        /// Neighbors that still hold a reference to `person`
        pending: Vec<PersonId>,
    },

    /// A field failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing store rejected an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Id generation exhausted its retries.
    #[error("Id generation failed: {0}")]
    IdGeneration(#[from] crate::id_generation::IdGenerationError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A person or relationship does not exist
    NotFound,
    /// An initial parent was rejected
    InvalidParent,
    /// Self-referencing edge
    IdenticalPerson,
    /// Edge already present
    DuplicateRelationship,
    /// Endpoints in different scopes
    ScopeMismatch,
    /// Scope has no persons
    EmptyScope,
    /// Cascading delete left references behind
    PartialCleanupFailure,
    /// Field validation
    Validation,
    /// Store, IO, serialization or configuration failure
    Storage,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PersonNotFound(_) | Error::RelationshipNotFound { .. } => ErrorKind::NotFound,
            Error::InvalidParent { .. } => ErrorKind::InvalidParent,
            Error::IdenticalPerson(_) => ErrorKind::IdenticalPerson,
            Error::DuplicateRelationship { .. } => ErrorKind::DuplicateRelationship,
            Error::ScopeMismatch { .. } => ErrorKind::ScopeMismatch,
            Error::EmptyScope(_) => ErrorKind::EmptyScope,
            Error::PartialCleanupFailure { .. } => ErrorKind::PartialCleanupFailure,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Storage(_)
            | Error::IdGeneration(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Json(_) => ErrorKind::Storage,
        }
    }
}

/// A specialized Result type for kinship operations.
pub type Result<T> = std::result::Result<T, Error>;
