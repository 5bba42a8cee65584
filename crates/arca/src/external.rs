//! External collaborator boundaries.
//!
//! The registry consumes two collaborators it does not implement: the
//! content store that resolves locators to bytes, and the identity
//! provider that supplies the caller's principal. Both arrive here as
//! traits; the registry performs authorization only and treats identities
//! as already authenticated.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use arca_core::{ContentLocator, Identity};

/// Failures from the content store collaborator.
///
/// The registry core never raises these during create/update/delete; they
/// surface only when surrounding code resolves a locator.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The referenced content could not be produced.
    #[error("content {0} unavailable")]
    Unavailable(ContentLocator),

    /// Transport-level failure talking to the store.
    #[error("content store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content-addressed byte storage.
///
/// Uploading happens entirely before `create`/`update` is invoked: callers
/// store bytes, obtain the locator, and hand the locator to the registry.
/// The registry itself only ever calls [`ContentStore::fetch`], and only
/// from [`crate::Registry::fetch_content`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store bytes and return their locator.
    async fn store(&self, bytes: Bytes) -> Result<ContentLocator, ContentError>;

    /// Produce the bytes referenced by `locator`.
    async fn fetch(&self, locator: &ContentLocator) -> Result<Bytes, ContentError>;
}

/// Source of the caller's identity for registry operations.
///
/// In the reference deployment this is the connected-wallet handshake; the
/// registry treats the result as an authenticated fact and derives
/// authorization from durable owner/ACL state only.
pub trait IdentityProvider: Send + Sync {
    /// The current caller.
    fn identity(&self) -> Identity;
}
