//! # Arca Store
//!
//! Storage abstraction for the Arca registry.
//!
//! The [`Store`] trait is the persistence seam: the registry is generic
//! over it and never touches a backend directly. Two implementations ship:
//!
//! - [`MemoryStore`] - the in-memory backend; primary for the core model
//!   and for tests
//! - [`SqliteStore`] - durable backend over rusqlite with versioned
//!   migrations
//!
//! ## Consistency
//!
//! Every trait method applies its entire effect atomically (one lock
//! section or one transaction). Owner and category indexes, the grant
//! table, and the monotonic id counter are maintained inside the same
//! atomic step as the archive rows they describe, which makes index
//! corruption and dangling grants unrepresentable rather than checked for.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
