//! Error types for the Arca core entity model.

use thiserror::Error;

/// Rejections of malformed create/update payloads.
///
/// All of these are recoverable: the caller corrects the payload and
/// retries. The registry validates before touching any state, so a
/// validation failure never leaves a partial effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("content locator must not be empty")]
    EmptyLocator,

    #[error("content locator is immutable; changing content means creating a new archive")]
    ContentImmutable,

    #[error("the owner already holds every capability; grants target non-owners")]
    GranteeIsOwner,
}
