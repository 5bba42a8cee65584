//! In-memory implementation of the Store trait.
//!
//! The primary backend for the in-memory core, and the backend tests run
//! against. Same semantics as SQLite with no persistence. Thread-safe via
//! RwLock; every trait method takes the lock once, so each operation is
//! atomic with respect to every other.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use arca_acl::{AclTable, CapabilitySet};
use arca_core::{Archive, ArchiveId, Identity};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Primary archive storage.
    archives: HashMap<ArchiveId, Archive>,

    /// Owner index. BTreeSet keeps per-owner listings in ascending id order.
    by_owner: HashMap<Identity, BTreeSet<ArchiveId>>,

    /// Category index.
    by_category: HashMap<String, BTreeSet<ArchiveId>>,

    /// Grant table.
    grants: AclTable,

    /// Monotonic id counter. Always max stored id + 1 or greater.
    next_id: u64,
}

impl MemoryStoreInner {
    fn index(&mut self, archive: &Archive) {
        self.by_owner
            .entry(archive.owner.clone())
            .or_default()
            .insert(archive.id);
        self.by_category
            .entry(archive.category.clone())
            .or_default()
            .insert(archive.id);
    }

    fn deindex(&mut self, archive: &Archive) {
        if let Some(ids) = self.by_owner.get_mut(&archive.owner) {
            ids.remove(&archive.id);
            if ids.is_empty() {
                self.by_owner.remove(&archive.owner);
            }
        }
        if let Some(ids) = self.by_category.get_mut(&archive.category) {
            ids.remove(&archive.id);
            if ids.is_empty() {
                self.by_category.remove(&archive.category);
            }
        }
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                archives: HashMap::new(),
                by_owner: HashMap::new(),
                by_category: HashMap::new(),
                grants: AclTable::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn allocate_id(&self) -> Result<ArchiveId> {
        let mut inner = self.inner.write().unwrap();
        let id = ArchiveId::from_u64(inner.next_id);
        inner.next_id += 1;
        Ok(id)
    }

    async fn insert_archive(&self, archive: &Archive) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        if inner.archives.contains_key(&archive.id) {
            return Err(StoreError::DuplicateId(archive.id));
        }

        inner.archives.insert(archive.id, archive.clone());
        inner.index(archive);
        Ok(())
    }

    async fn archive(&self, id: ArchiveId) -> Result<Option<Archive>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.archives.get(&id).cloned())
    }

    async fn archive_with_grant(
        &self,
        id: ArchiveId,
        caller: &Identity,
    ) -> Result<Option<(Archive, Option<CapabilitySet>)>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .archives
            .get(&id)
            .map(|archive| (archive.clone(), inner.grants.get(id, caller))))
    }

    async fn replace_archive(&self, archive: &Archive) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        let previous = inner
            .archives
            .get(&archive.id)
            .cloned()
            .ok_or(StoreError::UnknownArchive(archive.id))?;

        inner.deindex(&previous);
        inner.archives.insert(archive.id, archive.clone());
        inner.index(archive);
        Ok(())
    }

    async fn remove_archive(&self, id: ArchiveId) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();

        let Some(archive) = inner.archives.remove(&id) else {
            return Ok(false);
        };

        inner.deindex(&archive);
        inner.grants.remove_archive(id);
        Ok(true)
    }

    async fn put_grant(
        &self,
        id: ArchiveId,
        grantee: &Identity,
        capabilities: CapabilitySet,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        if !inner.archives.contains_key(&id) {
            return Err(StoreError::UnknownArchive(id));
        }

        inner.grants.put(id, grantee.clone(), capabilities);
        Ok(())
    }

    async fn remove_grant(&self, id: ArchiveId, grantee: &Identity) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.grants.remove(id, grantee);
        Ok(())
    }

    async fn grant(&self, id: ArchiveId, grantee: &Identity) -> Result<Option<CapabilitySet>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.grants.get(id, grantee))
    }

    async fn grants_for(&self, id: ArchiveId) -> Result<Vec<(Identity, CapabilitySet)>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.grants.grants_for(id))
    }

    async fn ids_by_owner(&self, owner: &Identity) -> Result<Vec<ArchiveId>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .by_owner
            .get(owner)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn ids_by_category(&self, category: &str) -> Result<Vec<ArchiveId>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .by_category
            .get(category)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn scan_with_grants(
        &self,
        caller: &Identity,
    ) -> Result<Vec<(Archive, Option<CapabilitySet>)>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .archives
            .values()
            .map(|archive| (archive.clone(), inner.grants.get(archive.id, caller)))
            .collect())
    }

    async fn archive_count(&self) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.archives.len() as u64)
    }
}
