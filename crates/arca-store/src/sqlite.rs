//! SQLite implementation of the Store trait.
//!
//! The durable backend for the Arca registry. Uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking. Every trait method
//! runs under the connection mutex, and compound mutations run inside a
//! transaction, so each operation is atomic with respect to every other.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use arca_acl::CapabilitySet;
use arca_core::{Archive, ArchiveId, ContentLocator, Identity, Visibility};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.as_ref().display(), "opened archive store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
        Some(format!("mutex poisoned: {}", e)),
    ))
}

// Column order used by every archive SELECT.
const ARCHIVE_COLUMNS: &str =
    "id, title, description, content, category, location, year, owner, created_at, visibility, tags";

// Helper to convert a row to Archive.
fn row_to_archive(row: &rusqlite::Row<'_>) -> rusqlite::Result<Archive> {
    let id: i64 = row.get("id")?;
    let content: String = row.get("content")?;
    let owner: String = row.get("owner")?;
    let year: i64 = row.get("year")?;
    let visibility: i64 = row.get("visibility")?;
    let tags_cbor: Vec<u8> = row.get("tags")?;

    let content = ContentLocator::new(content).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let visibility = Visibility::from_u8(visibility as u8).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            rusqlite::types::Type::Integer,
            format!("invalid visibility: {}", visibility).into(),
        )
    })?;

    let tags: Vec<String> = ciborium::from_reader(&tags_cbor[..]).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Blob, Box::new(e))
    })?;

    Ok(Archive {
        id: ArchiveId::from_u64(id as u64),
        title: row.get("title")?,
        description: row.get("description")?,
        content,
        category: row.get("category")?,
        location: row.get("location")?,
        year: year as i32,
        owner: Identity::from(owner),
        created_at: row.get("created_at")?,
        visibility,
        tags,
    })
}

// Helper to encode the tag list to CBOR.
fn encode_tags(tags: &[String]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(&tags, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_capabilities(bits: i64) -> Result<CapabilitySet> {
    CapabilitySet::from_bits(bits as u8).map_err(|e| StoreError::InvalidData(e.to_string()))
}

#[async_trait]
impl Store for SqliteStore {
    async fn allocate_id(&self) -> Result<ArchiveId> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let next: i64 = tx.query_row(
                "SELECT value FROM registry_meta WHERE key = 'next_id'",
                [],
                |row| row.get(0),
            )?;
            tx.execute(
                "UPDATE registry_meta SET value = value + 1 WHERE key = 'next_id'",
                [],
            )?;

            tx.commit()?;
            Ok(ArchiveId::from_u64(next as u64))
        })
        .await
    }

    async fn insert_archive(&self, archive: &Archive) -> Result<()> {
        let archive = archive.clone();

        self.with_conn(move |conn| {
            let tags = encode_tags(&archive.tags)?;

            let inserted = conn.execute(
                "INSERT OR IGNORE INTO archives (
                    id, title, description, content, category, location,
                    year, owner, created_at, visibility, tags
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    archive.id.as_u64() as i64,
                    archive.title,
                    archive.description,
                    archive.content.as_str(),
                    archive.category,
                    archive.location,
                    archive.year as i64,
                    archive.owner.as_str(),
                    archive.created_at,
                    archive.visibility.to_u8() as i64,
                    tags,
                ],
            )?;

            if inserted == 0 {
                return Err(StoreError::DuplicateId(archive.id));
            }
            Ok(())
        })
        .await
    }

    async fn archive(&self, id: ArchiveId) -> Result<Option<Archive>> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM archives WHERE id = ?1", ARCHIVE_COLUMNS),
                params![id.as_u64() as i64],
                row_to_archive,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn archive_with_grant(
        &self,
        id: ArchiveId,
        caller: &Identity,
    ) -> Result<Option<(Archive, Option<CapabilitySet>)>> {
        let caller = caller.clone();

        self.with_conn(move |conn| {
            let archive = conn
                .query_row(
                    &format!("SELECT {} FROM archives WHERE id = ?1", ARCHIVE_COLUMNS),
                    params![id.as_u64() as i64],
                    row_to_archive,
                )
                .optional()?;

            let Some(archive) = archive else {
                return Ok(None);
            };

            let bits: Option<i64> = conn
                .query_row(
                    "SELECT capabilities FROM grants WHERE archive_id = ?1 AND grantee = ?2",
                    params![id.as_u64() as i64, caller.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            let grant = bits.map(decode_capabilities).transpose()?;
            Ok(Some((archive, grant)))
        })
        .await
    }

    async fn replace_archive(&self, archive: &Archive) -> Result<()> {
        let archive = archive.clone();

        self.with_conn(move |conn| {
            let tags = encode_tags(&archive.tags)?;

            let updated = conn.execute(
                "UPDATE archives SET
                    title = ?2, description = ?3, content = ?4, category = ?5,
                    location = ?6, year = ?7, owner = ?8, created_at = ?9,
                    visibility = ?10, tags = ?11
                 WHERE id = ?1",
                params![
                    archive.id.as_u64() as i64,
                    archive.title,
                    archive.description,
                    archive.content.as_str(),
                    archive.category,
                    archive.location,
                    archive.year as i64,
                    archive.owner.as_str(),
                    archive.created_at,
                    archive.visibility.to_u8() as i64,
                    tags,
                ],
            )?;

            if updated == 0 {
                return Err(StoreError::UnknownArchive(archive.id));
            }
            Ok(())
        })
        .await
    }

    async fn remove_archive(&self, id: ArchiveId) -> Result<bool> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            // Cascade is declared on the grants table; the explicit delete
            // keeps the semantics visible even with foreign keys disabled.
            tx.execute(
                "DELETE FROM grants WHERE archive_id = ?1",
                params![id.as_u64() as i64],
            )?;
            let removed = tx.execute(
                "DELETE FROM archives WHERE id = ?1",
                params![id.as_u64() as i64],
            )?;

            tx.commit()?;
            Ok(removed > 0)
        })
        .await
    }

    async fn put_grant(
        &self,
        id: ArchiveId,
        grantee: &Identity,
        capabilities: CapabilitySet,
    ) -> Result<()> {
        let grantee = grantee.clone();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM archives WHERE id = ?1)",
                params![id.as_u64() as i64],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(StoreError::UnknownArchive(id));
            }

            if capabilities.is_empty() {
                tx.execute(
                    "DELETE FROM grants WHERE archive_id = ?1 AND grantee = ?2",
                    params![id.as_u64() as i64, grantee.as_str()],
                )?;
            } else {
                tx.execute(
                    "INSERT OR REPLACE INTO grants (archive_id, grantee, capabilities)
                     VALUES (?1, ?2, ?3)",
                    params![
                        id.as_u64() as i64,
                        grantee.as_str(),
                        capabilities.bits() as i64
                    ],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn remove_grant(&self, id: ArchiveId, grantee: &Identity) -> Result<()> {
        let grantee = grantee.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM grants WHERE archive_id = ?1 AND grantee = ?2",
                params![id.as_u64() as i64, grantee.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn grant(&self, id: ArchiveId, grantee: &Identity) -> Result<Option<CapabilitySet>> {
        let grantee = grantee.clone();

        self.with_conn(move |conn| {
            let bits: Option<i64> = conn
                .query_row(
                    "SELECT capabilities FROM grants WHERE archive_id = ?1 AND grantee = ?2",
                    params![id.as_u64() as i64, grantee.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            bits.map(decode_capabilities).transpose()
        })
        .await
    }

    async fn grants_for(&self, id: ArchiveId) -> Result<Vec<(Identity, CapabilitySet)>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT grantee, capabilities FROM grants
                 WHERE archive_id = ?1 ORDER BY grantee",
            )?;

            let rows = stmt
                .query_map(params![id.as_u64() as i64], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(grantee, bits)| Ok((Identity::from(grantee), decode_capabilities(bits)?)))
                .collect()
        })
        .await
    }

    async fn ids_by_owner(&self, owner: &Identity) -> Result<Vec<ArchiveId>> {
        let owner = owner.clone();

        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM archives WHERE owner = ?1 ORDER BY id")?;

            let ids = stmt
                .query_map(params![owner.as_str()], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(ids
                .into_iter()
                .map(|id| ArchiveId::from_u64(id as u64))
                .collect())
        })
        .await
    }

    async fn ids_by_category(&self, category: &str) -> Result<Vec<ArchiveId>> {
        let category = category.to_string();

        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM archives WHERE category = ?1 ORDER BY id")?;

            let ids = stmt
                .query_map(params![category], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(ids
                .into_iter()
                .map(|id| ArchiveId::from_u64(id as u64))
                .collect())
        })
        .await
    }

    async fn scan_with_grants(
        &self,
        caller: &Identity,
    ) -> Result<Vec<(Archive, Option<CapabilitySet>)>> {
        let caller = caller.clone();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.title, a.description, a.content, a.category, a.location,
                        a.year, a.owner, a.created_at, a.visibility, a.tags,
                        g.capabilities
                 FROM archives a
                 LEFT JOIN grants g ON g.archive_id = a.id AND g.grantee = ?1",
            )?;

            let rows = stmt
                .query_map(params![caller.as_str()], |row| {
                    let archive = row_to_archive(row)?;
                    let bits: Option<i64> = row.get(11)?;
                    Ok((archive, bits))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(archive, bits)| Ok((archive, bits.map(decode_capabilities).transpose()?)))
                .collect()
        })
        .await
    }

    async fn archive_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM archives", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}
