//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a registry over the memory
//! backend, fabricated identities, and in-memory stand-ins for the two
//! external collaborators.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use rand::RngCore;

use arca::{ContentError, ContentStore, IdentityProvider, Registry};
use arca_core::{ArchiveDraft, ContentLocator, Identity, Visibility};
use arca_store::MemoryStore;

/// A test fixture with a registry and two named identities.
pub struct TestFixture {
    pub registry: Registry<MemoryStore>,
    /// Owns the archives the fixture creates.
    pub curator: Identity,
    /// A non-owner to probe grants with.
    pub visitor: Identity,
}

impl TestFixture {
    /// Create a fixture with random identities.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(MemoryStore::new()),
            curator: random_identity(),
            visitor: random_identity(),
        }
    }

    /// Create with fixed identities for deterministic assertions.
    pub fn with_identities(curator: Identity, visitor: Identity) -> Self {
        Self {
            registry: Registry::new(MemoryStore::new()),
            curator,
            visitor,
        }
    }

    /// A minimal valid draft with a deterministic locator.
    pub fn draft(&self, title: &str) -> ArchiveDraft {
        ArchiveDraft::new(title, locator_for(title))
    }

    /// Create a private archive owned by the curator.
    pub async fn create_private(&self, title: &str) -> arca::Result<arca_core::ArchiveId> {
        self.registry.create(&self.curator, self.draft(title)).await
    }

    /// Create a public archive owned by the curator.
    pub async fn create_public(&self, title: &str) -> arca::Result<arca_core::ArchiveId> {
        self.registry
            .create(
                &self.curator,
                self.draft(title).visibility(Visibility::Public),
            )
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A random 20-byte wallet-style identity.
pub fn random_identity() -> Identity {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    Identity::from(format!("0x{}", hex::encode(bytes)))
}

/// Deterministic identities for multi-party tests.
pub fn multi_party_identities(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[0] = i as u8;
            Identity::from(format!("0x{}", hex::encode(bytes)))
        })
        .collect()
}

/// A deterministic locator derived from a seed string.
pub fn locator_for(seed: &str) -> ContentLocator {
    ContentLocator::new(hex::encode(blake3::hash(seed.as_bytes()).as_bytes()))
        .expect("blake3 hex is never empty")
}

/// In-memory content store: locator = hex Blake3 of the bytes.
///
/// Mirrors the contract of the real collaborator: upload first, hand the
/// locator to the registry afterwards.
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<ContentLocator, Bytes>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn store(&self, bytes: Bytes) -> Result<ContentLocator, ContentError> {
        let locator = ContentLocator::new(hex::encode(blake3::hash(&bytes).as_bytes()))
            .expect("blake3 hex is never empty");
        self.blobs
            .write()
            .unwrap()
            .insert(locator.clone(), bytes);
        Ok(locator)
    }

    async fn fetch(&self, locator: &ContentLocator) -> Result<Bytes, ContentError> {
        self.blobs
            .read()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or_else(|| ContentError::Unavailable(locator.clone()))
    }
}

/// Identity provider that always answers with one fixed identity.
pub struct StaticIdentityProvider(pub Identity);

impl IdentityProvider for StaticIdentityProvider {
    fn identity(&self) -> Identity {
        self.0.clone()
    }
}
