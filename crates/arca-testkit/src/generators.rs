//! Proptest generators for property-based testing.

use proptest::prelude::*;

use arca_acl::{Capability, CapabilitySet};
use arca_core::{ArchiveDraft, ArchivePatch, ContentLocator, Identity, Visibility};

/// Generate a wallet-style identity token.
pub fn identity() -> impl Strategy<Value = Identity> {
    "[0-9a-f]{40}".prop_map(|hex| Identity::from(format!("0x{}", hex)))
}

/// Generate a CID-shaped content locator.
pub fn locator() -> impl Strategy<Value = ContentLocator> {
    "Qm[1-9A-HJ-NP-Za-km-z]{8,44}"
        .prop_map(|s| ContentLocator::new(s).expect("generated locator is non-empty"))
}

/// Generate a non-empty title.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,23}".prop_map(String::from)
}

/// Generate a category from the reference set, including uncategorized.
pub fn category() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("文物".to_string()),
        Just("音频".to_string()),
        Just("视频".to_string()),
        Just("图片".to_string()),
        Just("文档".to_string()),
        Just("其他".to_string()),
    ]
}

/// Generate a visibility.
pub fn visibility() -> impl Strategy<Value = Visibility> {
    prop_oneof![Just(Visibility::Public), Just(Visibility::Private)]
}

/// Generate a single capability.
pub fn capability() -> impl Strategy<Value = Capability> {
    prop_oneof![
        Just(Capability::View),
        Just(Capability::Edit),
        Just(Capability::Delete),
    ]
}

/// Generate any capability set, the empty one included.
pub fn capability_set() -> impl Strategy<Value = CapabilitySet> {
    (0u8..=0b111).prop_map(|bits| CapabilitySet::from_bits(bits).expect("bits within mask"))
}

/// Generate a tag list, duplicates allowed.
pub fn tags() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z\u{4e00}-\u{4e2f}]{1,8}", 0..6)
}

/// Parameters for generating a draft.
#[derive(Debug, Clone)]
pub struct DraftParams {
    pub title: String,
    pub description: String,
    pub locator: ContentLocator,
    pub category: String,
    pub location: String,
    pub year: i32,
    pub visibility: Visibility,
    pub tags: Vec<String>,
}

impl Arbitrary for DraftParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            title(),
            "[A-Za-z0-9 ]{0,64}",
            locator(),
            category(),
            "[A-Za-z ]{0,24}",
            0i32..=2100,
            visibility(),
            tags(),
        )
            .prop_map(
                |(title, description, locator, category, location, year, visibility, tags)| {
                    DraftParams {
                        title,
                        description,
                        locator,
                        category,
                        location,
                        year,
                        visibility,
                        tags,
                    }
                },
            )
            .boxed()
    }
}

/// Build a draft from parameters.
pub fn draft_from_params(params: &DraftParams) -> ArchiveDraft {
    ArchiveDraft::new(params.title.clone(), params.locator.clone())
        .description(params.description.clone())
        .category(params.category.clone())
        .location(params.location.clone())
        .year(params.year)
        .visibility(params.visibility)
        .tags(params.tags.clone())
}

/// Generate a patch that passes validation (no content change, no empty
/// title).
pub fn valid_patch() -> impl Strategy<Value = ArchivePatch> {
    (
        proptest::option::of(title()),
        proptest::option::of("[A-Za-z0-9 ]{0,64}".prop_map(String::from)),
        proptest::option::of(category()),
        proptest::option::of(0i32..=2100),
        proptest::option::of(visibility()),
        proptest::option::of(tags()),
    )
        .prop_map(|(title, description, category, year, visibility, tags)| {
            let mut patch = ArchivePatch::new();
            patch.title = title;
            patch.description = description;
            patch.category = category;
            patch.year = year;
            patch.visibility = visibility;
            patch.tags = tags;
            patch
        })
}
