//! Error types for the ACL module.

use thiserror::Error;

/// Errors that can occur decoding capability data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AclError {
    /// A stored bitmask carries bits outside `{View, Edit, Delete}`.
    #[error("invalid capability bits: {0:#05b}")]
    InvalidBits(u8),
}
