//! Store trait: the abstract interface for registry persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include an in-memory backend (primary for the core, also used in tests)
//! and SQLite (durable).

use async_trait::async_trait;

use arca_acl::CapabilitySet;
use arca_core::{Archive, ArchiveId, Identity};

use crate::error::Result;

/// The Store trait: async interface for archive and grant persistence.
///
/// # Design Notes
///
/// - **Atomic operations**: every method applies its entire effect in one
///   lock section (memory) or one transaction (SQLite). The registry
///   serializes mutations above this trait, so a reader interleaved with a
///   mutation sees full pre- or post-state, never a torn one.
/// - **Indexes live here**: the owner and category indexes are updated in
///   the same atomic step as the archive row they describe. There is no
///   code path that can leave them out of sync.
/// - **Referential integrity**: grants can only be written for archives the
///   store holds, and removing an archive removes its grants in the same
///   step. A dangling grant is unrepresentable.
/// - **Counter invariant**: `allocate_id` is monotonic and never reset;
///   the counter is always at least one greater than every stored id.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Id Allocation
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate the next archive id. Never returns the same id twice, even
    /// across deletions (and, for durable backends, across restarts).
    async fn allocate_id(&self) -> Result<ArchiveId>;

    // ─────────────────────────────────────────────────────────────────────────
    // Archive Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a new archive and index it by owner and category.
    ///
    /// Fails with `DuplicateId` if the id is already present.
    async fn insert_archive(&self, archive: &Archive) -> Result<()>;

    /// Fetch an archive by id.
    async fn archive(&self, id: ArchiveId) -> Result<Option<Archive>>;

    /// Fetch an archive together with `caller`'s grant for it, as one
    /// atomic read. This is the authorization read: both values come from
    /// the same state snapshot.
    async fn archive_with_grant(
        &self,
        id: ArchiveId,
        caller: &Identity,
    ) -> Result<Option<(Archive, Option<CapabilitySet>)>>;

    /// Replace a stored archive, reindexing as needed.
    ///
    /// Fails with `UnknownArchive` if the id is not present; a replace
    /// never resurrects a deleted archive.
    async fn replace_archive(&self, archive: &Archive) -> Result<()>;

    /// Remove an archive, its index entries, and every grant scoped to it,
    /// as one atomic step. Returns whether the archive existed.
    async fn remove_archive(&self, id: ArchiveId) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the grant for `(id, grantee)`, overwriting any existing entry.
    /// An empty set removes the entry. Fails with `UnknownArchive` if the
    /// archive is not present.
    async fn put_grant(
        &self,
        id: ArchiveId,
        grantee: &Identity,
        capabilities: CapabilitySet,
    ) -> Result<()>;

    /// Remove the grant for `(id, grantee)`. Absence is not an error.
    async fn remove_grant(&self, id: ArchiveId, grantee: &Identity) -> Result<()>;

    /// Look up the grant for `(id, grantee)`. Never an empty set.
    async fn grant(&self, id: ArchiveId, grantee: &Identity) -> Result<Option<CapabilitySet>>;

    /// All grants for one archive, ordered by grantee token.
    async fn grants_for(&self, id: ArchiveId) -> Result<Vec<(Identity, CapabilitySet)>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Index and Scan Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Ids of archives owned by `owner`, ascending.
    async fn ids_by_owner(&self, owner: &Identity) -> Result<Vec<ArchiveId>>;

    /// Ids of archives in `category`, ascending.
    async fn ids_by_category(&self, category: &str) -> Result<Vec<ArchiveId>>;

    /// Every archive paired with `caller`'s grant for it, as one atomic
    /// read. Unordered; callers sort.
    async fn scan_with_grants(
        &self,
        caller: &Identity,
    ) -> Result<Vec<(Archive, Option<CapabilitySet>)>>;

    /// Number of stored archives.
    async fn archive_count(&self) -> Result<u64>;
}
