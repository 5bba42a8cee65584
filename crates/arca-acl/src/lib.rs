//! # Arca ACL
//!
//! Capability sets, the per-archive grant table, and the effective-
//! capability derivation used for every authorization decision.
//!
//! ## Model
//!
//! - A [`Capability`] is one of `View`, `Edit`, `Delete`.
//! - A [`CapabilitySet`] is a 3-bit mask over those; the empty set is
//!   indistinguishable from holding no grant.
//! - The [`AclTable`] maps `(archive id, grantee)` to a non-empty set and
//!   never outlives its archive.
//! - [`effective_capabilities`] is the single authorization rule: the
//!   owner implicitly holds everything and bypasses the table entirely;
//!   anyone else gets their recorded entry, plus `View` when the archive
//!   is public.
//!
//! Grants are managed exclusively by the archive owner. Delegation is not
//! transitive: holding `Edit` does not allow granting to others.

pub mod access;
pub mod capability;
pub mod error;
pub mod table;

pub use access::{effective_capabilities, Access};
pub use capability::{Capability, CapabilitySet};
pub use error::AclError;
pub use table::AclTable;
