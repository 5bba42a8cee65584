//! # Arca Core
//!
//! Entity model for the Arca archive registry: archives, identities, and
//! content locators.
//!
//! This crate contains no I/O, no storage, no authorization logic. It is
//! pure data and validation.
//!
//! ## Key Types
//!
//! - [`Archive`] - A content-addressed record with exactly one owner
//! - [`ArchiveId`] - Registry-assigned identifier, never reused
//! - [`Identity`] - Opaque principal token used for ownership checks
//! - [`ContentLocator`] - Opaque reference to externally stored bytes
//!
//! ## Immutability
//!
//! The content locator, owner, id, and creation timestamp are fixed at
//! creation. Changing content means creating a new archive; that is the
//! content-addressing contract.

pub mod archive;
pub mod error;
pub mod types;
pub mod validation;

pub use archive::{normalize_tags, Archive, ArchiveDraft, ArchivePatch, Visibility};
pub use error::ValidationError;
pub use types::{ArchiveId, ContentLocator, Identity};
pub use validation::{validate_draft, validate_patch};
