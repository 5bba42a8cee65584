//! Capabilities and capability sets.
//!
//! A capability is a unit of permitted action on an archive. Sets are
//! encoded as a 3-bit mask, matching the wire encoding of the reference
//! grant call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AclError;

/// A single permitted action on an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Capability {
    /// Read the archive record (and fetch its content).
    View = 0b001,
    /// Change mutable metadata fields.
    Edit = 0b010,
    /// Remove the archive and its grants.
    Delete = 0b100,
}

impl Capability {
    /// All capabilities, in display order.
    pub const ALL: [Capability; 3] = [Capability::View, Capability::Edit, Capability::Delete];

    const fn bit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::View => f.write_str("view"),
            Capability::Edit => f.write_str("edit"),
            Capability::Delete => f.write_str("delete"),
        }
    }
}

/// A subset of `{View, Edit, Delete}`.
///
/// The empty set is semantically identical to holding no grant at all;
/// [`crate::AclTable`] normalizes empty entries away on insert.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    const MASK: u8 = 0b111;

    /// No capabilities.
    pub const EMPTY: Self = Self(0);

    /// Every capability. What the owner implicitly holds.
    pub const FULL: Self = Self(Self::MASK);

    /// The empty set.
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// A set holding exactly one capability.
    pub fn just(capability: Capability) -> Self {
        Self(capability.bit())
    }

    /// Decode from a stored bitmask, rejecting bits outside the mask.
    pub fn from_bits(bits: u8) -> Result<Self, AclError> {
        if bits & !Self::MASK != 0 {
            return Err(AclError::InvalidBits(bits));
        }
        Ok(Self(bits))
    }

    /// Encode for storage.
    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, capability: Capability) -> bool {
        self.0 & (capability as u8) != 0
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    /// Builder-style insert.
    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterate over the contained capabilities in display order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        Self::just(capability)
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilitySet({})", self)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for capability in self.iter() {
            if !first {
                f.write_str("+")?;
            }
            write!(f, "{}", capability)?;
            first = false;
        }
        Ok(())
    }
}
