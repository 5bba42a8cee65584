//! Error types for the registry.

use std::fmt;

use thiserror::Error;

use arca_core::{ArchiveId, ValidationError};
use arca_store::StoreError;

use crate::external::ContentError;

/// What a caller was trying to do when authorization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Delete,
    /// Grant or revoke capabilities; reserved to the owner.
    ManageGrants,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View => f.write_str("view"),
            Action::Edit => f.write_str("edit"),
            Action::Delete => f.write_str("delete"),
            Action::ManageGrants => f.write_str("manage grants for"),
        }
    }
}

/// Errors that can occur during registry operations.
///
/// Mutation failures leave state exactly as it was before the call:
/// validation happens before any state is read, and the state change
/// itself is a single atomic store operation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed create/update payload. Recoverable: correct and retry.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// No archive with this id. Terminal for the request.
    #[error("archive {0} not found")]
    NotFound(ArchiveId),

    /// Authorization failure. Terminal for this identity; never partially
    /// applied.
    #[error("not authorized to {action} archive {id}")]
    Forbidden { id: ArchiveId, action: Action },

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Collaborator failure resolving a content locator. Raised only by
    /// [`crate::Registry::fetch_content`], never by core mutations.
    #[error("content error: {0}")]
    Content(#[from] ContentError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
