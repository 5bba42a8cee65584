//! Strong type definitions for the Arca registry.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Identifier of an archive record.
///
/// Assigned by the registry from a monotonic counter starting at 1.
/// Ids are never reused, even after the archive is deleted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArchiveId(pub u64);

impl ArchiveId {
    /// Create an ArchiveId from a raw counter value.
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw counter value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchiveId({})", self.0)
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ArchiveId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// An opaque principal identifier.
///
/// The registry treats identities as already-authenticated tokens supplied
/// by the identity provider (an address-like string in the reference
/// deployment). Equality and hashing only; the internal structure is never
/// interpreted.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Wrap a raw principal token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, `0x1234…5678` style.
    ///
    /// Falls back to the full token when it is too short to truncate or
    /// not plain ASCII.
    pub fn short(&self) -> String {
        if self.0.len() > 12 && self.0.is_ascii() {
            format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for Identity {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// An opaque reference to externally stored, content-addressed bytes.
///
/// The registry stores and compares locators but never resolves them; the
/// content store collaborator does. Non-empty by construction. Two distinct
/// archives may reference the same locator.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentLocator(String);

impl ContentLocator {
    /// Wrap a raw locator, rejecting the empty string.
    pub fn new(locator: impl Into<String>) -> Result<Self, ValidationError> {
        let locator = locator.into();
        if locator.is_empty() {
            return Err(ValidationError::EmptyLocator);
        }
        Ok(Self(locator))
    }

    /// The raw locator string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the locator holds a non-empty reference.
    ///
    /// Always true for locators built through [`ContentLocator::new`];
    /// deserialized values are re-checked by draft validation.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Debug for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentLocator({})", self.0)
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentLocator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
