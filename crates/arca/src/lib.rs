//! # Arca
//!
//! The unified API for the Arca system - an authoritative registry of
//! immutable, content-addressed cultural-heritage records with
//! capability-based access control.
//!
//! ## Overview
//!
//! - **Archives**: content-addressed records with exactly one owner. The
//!   content locator is fixed at creation; changing content means creating
//!   a new archive.
//! - **Capabilities**: `View`, `Edit`, `Delete` - granted per archive, per
//!   identity, exclusively by the owner. The owner implicitly holds all
//!   three and bypasses the grant table entirely.
//! - **Registry**: the sole writer of archive and grant state. Every
//!   operation re-derives authorization from durable state and applies its
//!   effect atomically.
//!
//! Content bytes and caller authentication live outside the core; see
//! [`ContentStore`] and [`IdentityProvider`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arca::{Registry, Capability, CapabilitySet};
//! use arca::core::{ArchiveDraft, ContentLocator, Identity, Visibility};
//! use arca::store::MemoryStore;
//!
//! async fn example() -> arca::Result<()> {
//!     let registry = Registry::new(MemoryStore::new());
//!
//!     let curator = Identity::from("0x1234567890abcdef1234567890abcdef12345678");
//!     let visitor = Identity::from("0xabcdef1234567890abcdef1234567890abcdef12");
//!
//!     let draft = ArchiveDraft::new(
//!         "Shadow Puppet Collection",
//!         ContentLocator::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")?,
//!     )
//!     .category("文物")
//!     .visibility(Visibility::Private);
//!
//!     let id = registry.create(&curator, draft).await?;
//!
//!     // Private: the visitor needs an explicit View grant.
//!     registry
//!         .grant(&curator, id, &visitor, CapabilitySet::just(Capability::View))
//!         .await?;
//!     let archive = registry.get(&visitor, id).await?;
//!     assert_eq!(archive.id, id);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `arca::core` - entity model (Archive, Identity, ContentLocator, ...)
//! - `arca::acl` - capabilities and the grant table
//! - `arca::store` - storage abstraction, memory and SQLite backends

pub mod error;
pub mod external;
pub mod registry;

// Re-export component crates
pub use arca_acl as acl;
pub use arca_core as core;
pub use arca_store as store;

// Re-export main types for convenience
pub use error::{Action, RegistryError, Result};
pub use external::{ContentError, ContentStore, IdentityProvider};
pub use registry::Registry;

// Re-export commonly used component types
pub use arca_acl::{Access, Capability, CapabilitySet};
pub use arca_core::{
    Archive, ArchiveDraft, ArchiveId, ArchivePatch, ContentLocator, Identity, Visibility,
};
