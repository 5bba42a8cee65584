//! The Registry: sole authority over archive and ACL state.
//!
//! Every operation authorizes against durable owner/ACL state before
//! touching anything, applies its whole effect through one atomic store
//! call, and serializes with other mutations through the write gate.
//! Authorization is re-derived on every call; the registry never caches a
//! trust decision.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use arca_acl::{effective_capabilities, Access, Capability, CapabilitySet};
use arca_core::{
    validate_draft, validate_patch, Archive, ArchiveDraft, ArchiveId, ArchivePatch, Identity,
    ValidationError,
};
use arca_store::Store;

use crate::error::{Action, RegistryError, Result};
use crate::external::ContentStore;

/// The registry aggregate.
///
/// Generic over the storage backend. Reads run concurrently; mutations are
/// totally ordered by the write gate, and each mutation's state change is
/// one atomic store call, so concurrent readers observe full pre- or
/// post-mutation state and nothing in between.
pub struct Registry<S: Store> {
    store: Arc<S>,
    write_gate: Mutex<()>,
}

impl<S: Store> Registry<S> {
    /// Create a registry over the given backend.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            write_gate: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an archive owned by `owner`.
    ///
    /// Requires a non-empty title and content locator. The new archive is
    /// visible to reads as soon as this returns.
    pub async fn create(&self, owner: &Identity, draft: ArchiveDraft) -> Result<ArchiveId> {
        validate_draft(&draft)?;

        let _gate = self.write_gate.lock().await;

        let id = self.store.allocate_id().await?;
        let archive = Archive::from_draft(id, owner.clone(), now_millis(), draft);
        self.store.insert_archive(&archive).await?;

        tracing::debug!(%id, owner = %owner.short(), "created archive");
        Ok(id)
    }

    /// Apply a patch to an archive's mutable metadata.
    ///
    /// Caller must be the owner or hold `Edit`. The patch is validated
    /// before any state is touched; a rejection on any field aborts the
    /// entire update with no partial effect. `content`, `owner`,
    /// `created_at`, and `id` cannot be changed.
    pub async fn update(&self, caller: &Identity, id: ArchiveId, patch: ArchivePatch) -> Result<()> {
        validate_patch(&patch)?;

        let _gate = self.write_gate.lock().await;

        let mut archive = self
            .authorized(caller, id, Capability::Edit, Action::Edit)
            .await?;
        archive.apply(patch);
        self.store.replace_archive(&archive).await?;
        Ok(())
    }

    /// Remove an archive and every grant scoped to it, atomically.
    ///
    /// Caller must be the owner or hold `Delete`. The id is never
    /// reassigned.
    pub async fn delete(&self, caller: &Identity, id: ArchiveId) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        self.authorized(caller, id, Capability::Delete, Action::Delete)
            .await?;
        self.store.remove_archive(id).await?;

        tracing::debug!(%id, "deleted archive");
        Ok(())
    }

    /// Set `grantee`'s capabilities on an archive, overwriting any
    /// existing grant. The empty set is equivalent to revoke.
    ///
    /// Owner-only: capability delegation is not transitive, so an `Edit`
    /// holder cannot grant to others. Granting to the owner is rejected -
    /// the owner implicitly holds everything and can never carry an
    /// explicit entry.
    pub async fn grant(
        &self,
        caller: &Identity,
        id: ArchiveId,
        grantee: &Identity,
        capabilities: CapabilitySet,
    ) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        let archive = self.owned(caller, id).await?;
        if archive.owner == *grantee {
            return Err(RegistryError::InvalidInput(ValidationError::GranteeIsOwner));
        }

        self.store.put_grant(id, grantee, capabilities).await?;

        tracing::debug!(%id, grantee = %grantee.short(), %capabilities, "granted capabilities");
        Ok(())
    }

    /// Remove `grantee`'s grant on an archive.
    ///
    /// Owner-only. Idempotent: revoking an absent grant is success.
    pub async fn revoke(&self, caller: &Identity, id: ArchiveId, grantee: &Identity) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        self.owned(caller, id).await?;
        self.store.remove_grant(id, grantee).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch an archive.
    ///
    /// Private archives require ownership or a `View` grant; public ones
    /// are readable by anyone.
    pub async fn get(&self, caller: &Identity, id: ArchiveId) -> Result<Archive> {
        self.authorized(caller, id, Capability::View, Action::View)
            .await
    }

    /// Ids of archives owned by `owner`, ascending. Empty when none.
    pub async fn list_by_owner(&self, owner: &Identity) -> Result<Vec<ArchiveId>> {
        Ok(self.store.ids_by_owner(owner).await?)
    }

    /// Ids of archives in `category`, ascending. Empty when none.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<ArchiveId>> {
        Ok(self.store.ids_by_category(category).await?)
    }

    /// Archives visible to `caller` whose title, description, or tags
    /// contain `query` case-insensitively, optionally restricted to an
    /// exact category. Reverse-chronological by creation time, newest
    /// first; stable across repeated calls with unchanged state.
    pub async fn search(
        &self,
        caller: &Identity,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<Archive>> {
        let mut matches: Vec<Archive> = self
            .store
            .scan_with_grants(caller)
            .await?
            .into_iter()
            .filter(|(archive, entry)| {
                effective_capabilities(archive, caller, *entry).contains(Capability::View)
            })
            .map(|(archive, _)| archive)
            .filter(|archive| category.map_or(true, |c| archive.category == c))
            .filter(|archive| archive.matches(query))
            .collect();

        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matches)
    }

    /// Number of archives in the registry.
    pub async fn total_archives(&self) -> Result<u64> {
        Ok(self.store.archive_count().await?)
    }

    /// The caller's effective access to one archive, as a triple.
    pub async fn access(&self, caller: &Identity, id: ArchiveId) -> Result<Access> {
        let (archive, entry) = self
            .store
            .archive_with_grant(id, caller)
            .await?
            .ok_or(RegistryError::NotFound(id))?;
        Ok(Access::from(effective_capabilities(&archive, caller, entry)))
    }

    /// List an archive's grant table. Owner-only.
    pub async fn grants(
        &self,
        caller: &Identity,
        id: ArchiveId,
    ) -> Result<Vec<(Identity, CapabilitySet)>> {
        self.owned(caller, id).await?;
        Ok(self.store.grants_for(id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content Boundary
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve an archive's content through the external content store.
    ///
    /// Authorizes `View` exactly like [`Registry::get`], then hands the
    /// stored locator to the collaborator. This is the only registry path
    /// that can surface [`crate::ContentError`].
    pub async fn fetch_content<C: ContentStore>(
        &self,
        caller: &Identity,
        id: ArchiveId,
        content: &C,
    ) -> Result<Bytes> {
        let archive = self.get(caller, id).await?;
        Ok(content.fetch(&archive.content).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Load an archive and require `capability` for `caller`.
    ///
    /// The archive and the caller's grant are read in one atomic store
    /// call, and the decision is derived fresh from them. Fails closed.
    async fn authorized(
        &self,
        caller: &Identity,
        id: ArchiveId,
        capability: Capability,
        action: Action,
    ) -> Result<Archive> {
        let (archive, entry) = self
            .store
            .archive_with_grant(id, caller)
            .await?
            .ok_or(RegistryError::NotFound(id))?;

        if !effective_capabilities(&archive, caller, entry).contains(capability) {
            return Err(RegistryError::Forbidden { id, action });
        }
        Ok(archive)
    }

    /// Load an archive and require that `caller` is its owner.
    async fn owned(&self, caller: &Identity, id: ArchiveId) -> Result<Archive> {
        let archive = self
            .store
            .archive(id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;

        if archive.owner != *caller {
            return Err(RegistryError::Forbidden {
                id,
                action: Action::ManageGrants,
            });
        }
        Ok(archive)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
