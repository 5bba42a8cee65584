//! # Arca Testkit
//!
//! Testing utilities for the Arca workspace: fixtures, fabricated
//! identities, in-memory collaborator stand-ins, and proptest generators.
//!
//! The [`TestFixture`] wires a registry over the memory backend with a
//! curator and a visitor identity. [`MemoryContentStore`] implements the
//! content-store boundary with real content addressing (hex Blake3), and
//! [`StaticIdentityProvider`] satisfies the identity boundary.

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    locator_for, multi_party_identities, random_identity, MemoryContentStore,
    StaticIdentityProvider, TestFixture,
};
