//! Effective-capability derivation.
//!
//! This is the single authorization rule applied by every registry
//! operation: owner holds everything; otherwise the ACL entry plus `View`
//! when the archive is public. Re-derived from durable state on every call,
//! never cached.

use serde::{Deserialize, Serialize};

use arca_core::{Archive, Identity, Visibility};

use crate::capability::{Capability, CapabilitySet};

/// Compute what `caller` may do to `archive`, given the caller's ACL entry
/// (if any).
///
/// Fails closed: with no entry and a private archive the result is the
/// empty set.
pub fn effective_capabilities(
    archive: &Archive,
    caller: &Identity,
    entry: Option<CapabilitySet>,
) -> CapabilitySet {
    if archive.owner == *caller {
        return CapabilitySet::FULL;
    }

    let mut capabilities = entry.unwrap_or(CapabilitySet::EMPTY);
    if archive.visibility == Visibility::Public {
        capabilities.insert(Capability::View);
    }
    capabilities
}

/// A caller's access to one archive, as a plain triple.
///
/// This is the shape the presentation layer renders as permission badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Access {
    pub const NONE: Self = Self {
        can_view: false,
        can_edit: false,
        can_delete: false,
    };
}

impl From<CapabilitySet> for Access {
    fn from(capabilities: CapabilitySet) -> Self {
        Self {
            can_view: capabilities.contains(Capability::View),
            can_edit: capabilities.contains(Capability::Edit),
            can_delete: capabilities.contains(Capability::Delete),
        }
    }
}
