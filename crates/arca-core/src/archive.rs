//! Archive: the central registry entity.
//!
//! An archive is an immutable-content, mutable-metadata record with exactly
//! one owner. The content locator is fixed at creation; editing content
//! means creating a new archive.

use serde::{Deserialize, Serialize};

use crate::types::{ArchiveId, ContentLocator, Identity};

/// Who may view an archive without an explicit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Viewable by any identity, grant or not.
    Public,
    /// Viewable only by the owner and identities holding a View grant.
    Private,
}

impl Visibility {
    /// Encode for storage.
    pub fn to_u8(self) -> u8 {
        match self {
            Visibility::Public => 0,
            Visibility::Private => 1,
        }
    }

    /// Decode from storage.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Visibility::Public),
            1 => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A content-addressed cultural-heritage record.
///
/// `id`, `owner`, `content`, and `created_at` are set once at creation and
/// never change; everything else is editable through an [`ArchivePatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    /// Registry-assigned identifier. Never reused.
    pub id: ArchiveId,

    /// Non-empty display title.
    pub title: String,

    /// Free-form description, may be empty.
    pub description: String,

    /// Locator of the externally stored content. Immutable.
    pub content: ContentLocator,

    /// Category used for indexed lookup; empty means uncategorized.
    pub category: String,

    /// Descriptive provenance metadata.
    pub location: String,

    /// Year the item dates from.
    pub year: i32,

    /// The creating principal. Immutable; ownership transfer is out of scope.
    pub owner: Identity,

    /// Creation timestamp (Unix milliseconds). Immutable.
    pub created_at: i64,

    /// Who may view without a grant.
    pub visibility: Visibility,

    /// Tag set; duplicates collapse, insertion order preserved for display.
    pub tags: Vec<String>,
}

impl Archive {
    /// Materialize an archive from a validated draft.
    ///
    /// The registry owns id assignment and timestamping; the draft supplies
    /// everything else.
    pub fn from_draft(id: ArchiveId, owner: Identity, created_at: i64, draft: ArchiveDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            content: draft.content,
            category: draft.category,
            location: draft.location,
            year: draft.year,
            owner,
            created_at,
            visibility: draft.visibility,
            tags: normalize_tags(draft.tags),
        }
    }

    /// Apply a validated patch.
    ///
    /// The patch's `content` field is rejected during validation and is
    /// ignored here; `id`, `owner`, and `created_at` are not expressible in
    /// a patch at all.
    pub fn apply(&mut self, patch: ArchivePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(visibility) = patch.visibility {
            self.visibility = visibility;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
    }

    /// Case-insensitive substring match over title, description, and tags.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&query))
    }
}

/// Create payload for a new archive.
///
/// Everything the caller controls at creation time; the registry adds the
/// id, owner, and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDraft {
    pub title: String,
    pub description: String,
    pub content: ContentLocator,
    pub category: String,
    pub location: String,
    pub year: i32,
    pub visibility: Visibility,
    pub tags: Vec<String>,
}

impl ArchiveDraft {
    /// Start a draft with the two required fields.
    ///
    /// Defaults: empty description/category/location, year 0, no tags, and
    /// `Private` visibility.
    pub fn new(title: impl Into<String>, content: ContentLocator) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            content,
            category: String::new(),
            location: String::new(),
            year: 0,
            visibility: Visibility::Private,
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Field-wise update payload.
///
/// `None` leaves a field untouched. The `content` field exists only so the
/// registry can reject attempts to change it; `owner`, `created_at`, and
/// `id` cannot be expressed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Always rejected with `ValidationError::ContentImmutable` when set.
    pub content: Option<ContentLocator>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub year: Option<i32>,
    pub visibility: Option<Visibility>,
    pub tags: Option<Vec<String>>,
}

impl ArchivePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content(mut self, content: ContentLocator) -> Self {
        self.content = Some(content);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Collapse duplicate tags, keeping first-occurrence order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}
