//! Validation of create and update payloads.
//!
//! The registry validates before touching any state, so a rejection here
//! never leaves a partial effect.

use crate::archive::{ArchiveDraft, ArchivePatch};
use crate::error::ValidationError;

/// Check a create payload.
///
/// Requires a non-empty title and a non-empty content locator. The locator
/// is non-empty by construction for values built through
/// [`crate::ContentLocator::new`]; deserialized drafts are re-checked here.
pub fn validate_draft(draft: &ArchiveDraft) -> Result<(), ValidationError> {
    if draft.title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if !draft.content.is_valid() {
        return Err(ValidationError::EmptyLocator);
    }
    Ok(())
}

/// Check an update payload.
///
/// Rejects empty titles and any attempt to change the content locator.
/// A rejection on any field aborts the entire update.
pub fn validate_patch(patch: &ArchivePatch) -> Result<(), ValidationError> {
    if patch.content.is_some() {
        return Err(ValidationError::ContentImmutable);
    }
    if matches!(patch.title.as_deref(), Some("")) {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}
