//! The per-archive grant table.
//!
//! Keyed by `(archive id, grantee)`. An empty capability set is the same as
//! no entry; `put` normalizes it to a removal so empty entries can never be
//! observed.

use std::collections::HashMap;

use arca_core::{ArchiveId, Identity};

use crate::capability::CapabilitySet;

/// In-memory grant table.
///
/// Mutated only through the registry/store; never exposed for direct
/// external mutation.
#[derive(Debug, Clone, Default)]
pub struct AclTable {
    entries: HashMap<(ArchiveId, Identity), CapabilitySet>,
}

impl AclTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grant for `(id, grantee)`, overwriting any existing entry.
    ///
    /// An empty set removes the entry.
    pub fn put(&mut self, id: ArchiveId, grantee: Identity, capabilities: CapabilitySet) {
        if capabilities.is_empty() {
            self.entries.remove(&(id, grantee));
        } else {
            self.entries.insert((id, grantee), capabilities);
        }
    }

    /// Remove the grant for `(id, grantee)`. Absence is not an error.
    pub fn remove(&mut self, id: ArchiveId, grantee: &Identity) {
        self.entries.remove(&(id, grantee.clone()));
    }

    /// Look up the grant for `(id, grantee)`.
    ///
    /// Never returns an empty set; normalization guarantees absence instead.
    pub fn get(&self, id: ArchiveId, grantee: &Identity) -> Option<CapabilitySet> {
        self.entries.get(&(id, grantee.clone())).copied()
    }

    /// Drop every grant scoped to `id`. Called when the archive is removed.
    pub fn remove_archive(&mut self, id: ArchiveId) {
        self.entries.retain(|(archive_id, _), _| *archive_id != id);
    }

    /// All grants for one archive, ordered by grantee token for stability.
    pub fn grants_for(&self, id: ArchiveId) -> Vec<(Identity, CapabilitySet)> {
        let mut grants: Vec<(Identity, CapabilitySet)> = self
            .entries
            .iter()
            .filter(|((archive_id, _), _)| *archive_id == id)
            .map(|((_, grantee), capabilities)| (grantee.clone(), *capabilities))
            .collect();
        grants.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        grants
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
