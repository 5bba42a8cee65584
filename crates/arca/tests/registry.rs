//! Integration tests for the registry: ownership, grants, visibility,
//! atomicity, and the query surface, over both backends.

use std::sync::Arc;

use arca::core::{ArchiveDraft, ArchivePatch, ContentLocator, Identity, Visibility};
use arca::store::{MemoryStore, SqliteStore};
use arca::{Access, Capability, CapabilitySet, Registry, RegistryError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn registry() -> Registry<MemoryStore> {
    init_tracing();
    Registry::new(MemoryStore::new())
}

fn alice() -> Identity {
    Identity::from("0xa1ce00000000000000000000000000000000a1ce")
}

fn bob() -> Identity {
    Identity::from("0xb0b0000000000000000000000000000000000b0b")
}

fn carol() -> Identity {
    Identity::from("0xca201000000000000000000000000000000ca201")
}

fn locator(s: &str) -> ContentLocator {
    ContentLocator::new(s).unwrap()
}

fn draft(title: &str) -> ArchiveDraft {
    ArchiveDraft::new(title, locator("Qm1"))
}

#[tokio::test]
async fn test_create_then_get_reflects_creation() {
    let registry = registry();

    let id = registry
        .create(
            &alice(),
            draft("Shadow Puppets")
                .description("Shaanxi shadow puppet collection")
                .category("文物")
                .location("Xi'an")
                .year(1890)
                .tags(["皮影", "folk-art"]),
        )
        .await
        .unwrap();

    let archive = registry.get(&alice(), id).await.unwrap();
    assert_eq!(archive.id, id);
    assert_eq!(archive.title, "Shadow Puppets");
    assert_eq!(archive.owner, alice());
    assert_eq!(archive.category, "文物");
    assert_eq!(archive.tags, vec!["皮影", "folk-art"]);
    assert_eq!(archive.visibility, Visibility::Private);
    assert_eq!(registry.total_archives().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_rejects_invalid_draft() {
    let registry = registry();

    let err = registry.create(&alice(), draft("")).await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInput(_)));
    assert_eq!(registry.total_archives().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_visible_immediately() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Old Title")).await.unwrap();

    registry
        .update(
            &alice(),
            id,
            ArchivePatch::new().title("New Title").year(1920),
        )
        .await
        .unwrap();

    let archive = registry.get(&alice(), id).await.unwrap();
    assert_eq!(archive.title, "New Title");
    assert_eq!(archive.year, 1920);
}

#[tokio::test]
async fn test_delete_cascades_and_id_is_dead() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Doomed")).await.unwrap();
    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::View))
        .await
        .unwrap();

    registry.delete(&alice(), id).await.unwrap();

    // Every operation on the dead id reports NotFound.
    assert!(matches!(
        registry.get(&alice(), id).await.unwrap_err(),
        RegistryError::NotFound(_)
    ));
    assert!(matches!(
        registry
            .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::View))
            .await
            .unwrap_err(),
        RegistryError::NotFound(_)
    ));
    assert!(matches!(
        registry.revoke(&alice(), id, &bob()).await.unwrap_err(),
        RegistryError::NotFound(_)
    ));
    assert_eq!(registry.total_archives().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ids_never_reused() {
    let registry = registry();

    let id1 = registry.create(&alice(), draft("First")).await.unwrap();
    let id2 = registry.create(&alice(), draft("Second")).await.unwrap();
    let id3 = registry.create(&alice(), draft("Third")).await.unwrap();

    registry.delete(&alice(), id2).await.unwrap();

    let id4 = registry.create(&alice(), draft("Fourth")).await.unwrap();
    assert!(id4 > id3);
    assert!(id4 > id2);
    assert!(id4 > id1);
}

#[tokio::test]
async fn test_private_archive_grant_revoke_cycle() {
    // The concrete scenario: A creates a private archive, B is locked out,
    // a View grant lets B in, revoke locks B out again.
    let registry = registry();

    let id = registry
        .create(
            &alice(),
            ArchiveDraft::new("T1", locator("Qm1")).visibility(Visibility::Private),
        )
        .await
        .unwrap();
    assert_eq!(id.as_u64(), 1);

    assert!(matches!(
        registry.get(&bob(), id).await.unwrap_err(),
        RegistryError::Forbidden { .. }
    ));

    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::View))
        .await
        .unwrap();
    let archive = registry.get(&bob(), id).await.unwrap();
    assert_eq!(archive.id, id);

    registry.revoke(&alice(), id, &bob()).await.unwrap();
    assert!(matches!(
        registry.get(&bob(), id).await.unwrap_err(),
        RegistryError::Forbidden { .. }
    ));
}

#[tokio::test]
async fn test_public_readable_by_anyone_private_not() {
    let registry = registry();

    let public = registry
        .create(&alice(), draft("Open").visibility(Visibility::Public))
        .await
        .unwrap();
    let private = registry
        .create(&alice(), draft("Closed").visibility(Visibility::Private))
        .await
        .unwrap();

    assert!(registry.get(&bob(), public).await.is_ok());
    assert!(matches!(
        registry.get(&bob(), private).await.unwrap_err(),
        RegistryError::Forbidden { .. }
    ));
}

#[tokio::test]
async fn test_view_grant_is_per_grantee_not_global() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Closed")).await.unwrap();

    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::View))
        .await
        .unwrap();

    assert!(registry.get(&bob(), id).await.is_ok());
    // The grant flips visibility for bob only, not for carol.
    assert!(matches!(
        registry.get(&carol(), id).await.unwrap_err(),
        RegistryError::Forbidden { .. }
    ));
}

#[tokio::test]
async fn test_owner_cannot_be_locked_out() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Mine")).await.unwrap();

    // No grant/revoke sequence against others touches the owner.
    registry
        .grant(&alice(), id, &bob(), CapabilitySet::FULL)
        .await
        .unwrap();
    registry.revoke(&alice(), id, &bob()).await.unwrap();

    // An explicit entry for the owner is rejected outright.
    let err = registry
        .grant(&alice(), id, &alice(), CapabilitySet::just(Capability::View))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInput(_)));

    assert!(registry.get(&alice(), id).await.is_ok());
    registry
        .update(&alice(), id, ArchivePatch::new().title("Still Mine"))
        .await
        .unwrap();
    registry.delete(&alice(), id).await.unwrap();
}

#[tokio::test]
async fn test_edit_holder_cannot_grant() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Guarded")).await.unwrap();

    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::Edit))
        .await
        .unwrap();

    // Delegation is not transitive: bob may edit but not grant.
    let err = registry
        .grant(&bob(), id, &carol(), CapabilitySet::just(Capability::View))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Forbidden { .. }));

    let err = registry.revoke(&bob(), id, &bob()).await.unwrap_err();
    assert!(matches!(err, RegistryError::Forbidden { .. }));
}

#[tokio::test]
async fn test_patch_cannot_change_content() {
    let registry = registry();
    let id = registry
        .create(&alice(), ArchiveDraft::new("Fixed", locator("Qm1")))
        .await
        .unwrap();

    let err = registry
        .update(
            &alice(),
            id,
            ArchivePatch::new().title("Renamed").content(locator("Qm2")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInput(_)));

    // The whole patch aborted: content AND title are untouched.
    let archive = registry.get(&alice(), id).await.unwrap();
    assert_eq!(archive.content, locator("Qm1"));
    assert_eq!(archive.title, "Fixed");
}

#[tokio::test]
async fn test_forbidden_update_has_no_effect() {
    let registry = registry();
    let id = registry
        .create(&alice(), draft("Original").visibility(Visibility::Public))
        .await
        .unwrap();

    // View does not include Edit.
    let err = registry
        .update(&bob(), id, ArchivePatch::new().title("Defaced"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Forbidden { .. }));

    assert_eq!(registry.get(&alice(), id).await.unwrap().title, "Original");
}

#[tokio::test]
async fn test_revoke_absent_grant_is_success() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Quiet")).await.unwrap();

    registry.revoke(&alice(), id, &bob()).await.unwrap();
    registry.revoke(&alice(), id, &bob()).await.unwrap();
}

#[tokio::test]
async fn test_empty_grant_equals_revoke() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Closed")).await.unwrap();

    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::View))
        .await
        .unwrap();
    registry
        .grant(&alice(), id, &bob(), CapabilitySet::EMPTY)
        .await
        .unwrap();

    assert!(matches!(
        registry.get(&bob(), id).await.unwrap_err(),
        RegistryError::Forbidden { .. }
    ));
    assert!(registry.grants(&alice(), id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_category_exact_and_stable() {
    let registry = registry();

    let a = registry
        .create(&alice(), draft("Mirror").category("文物"))
        .await
        .unwrap();
    let b = registry
        .create(&alice(), draft("Folk Song").category("音频"))
        .await
        .unwrap();
    let c = registry
        .create(&bob(), draft("Seal").category("文物"))
        .await
        .unwrap();

    let first = registry.list_by_category("文物").await.unwrap();
    assert_eq!(first, vec![a, c]);
    assert!(!first.contains(&b));

    // Stable across repeated calls with unchanged state.
    assert_eq!(registry.list_by_category("文物").await.unwrap(), first);
    assert_eq!(registry.list_by_category("音频").await.unwrap(), vec![b]);
    assert!(registry.list_by_category("视频").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_owner() {
    let registry = registry();

    let a = registry.create(&alice(), draft("One")).await.unwrap();
    let b = registry.create(&bob(), draft("Two")).await.unwrap();
    let c = registry.create(&alice(), draft("Three")).await.unwrap();

    assert_eq!(registry.list_by_owner(&alice()).await.unwrap(), vec![a, c]);
    assert_eq!(registry.list_by_owner(&bob()).await.unwrap(), vec![b]);
    assert!(registry.list_by_owner(&carol()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_title_description_tags() {
    let registry = registry();

    registry
        .create(
            &alice(),
            draft("Bronze Mirror")
                .visibility(Visibility::Public)
                .category("文物"),
        )
        .await
        .unwrap();
    registry
        .create(
            &alice(),
            draft("Folk Recording")
                .description("wax cylinder with bronze horn")
                .visibility(Visibility::Public)
                .category("音频"),
        )
        .await
        .unwrap();
    registry
        .create(
            &alice(),
            draft("Woodblock Print")
                .tag("bronze-age")
                .visibility(Visibility::Public)
                .category("图片"),
        )
        .await
        .unwrap();

    // Case-insensitive substring across all three fields.
    let hits = registry.search(&bob(), "BRONZE", None).await.unwrap();
    assert_eq!(hits.len(), 3);

    // Category restriction narrows the same query.
    let hits = registry.search(&bob(), "bronze", Some("音频")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Folk Recording");

    let hits = registry.search(&bob(), "porcelain", None).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_search_respects_visibility() {
    let registry = registry();

    let hidden = registry
        .create(&alice(), draft("Hidden Mirror"))
        .await
        .unwrap();
    registry
        .create(&alice(), draft("Public Mirror").visibility(Visibility::Public))
        .await
        .unwrap();

    let hits = registry.search(&bob(), "mirror", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Public Mirror");

    // A View grant widens bob's results, and only bob's.
    registry
        .grant(
            &alice(),
            hidden,
            &bob(),
            CapabilitySet::just(Capability::View),
        )
        .await
        .unwrap();
    assert_eq!(registry.search(&bob(), "mirror", None).await.unwrap().len(), 2);
    assert_eq!(
        registry.search(&carol(), "mirror", None).await.unwrap().len(),
        1
    );

    // The owner always sees everything of theirs.
    assert_eq!(
        registry.search(&alice(), "mirror", None).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_search_order_newest_first_and_stable() {
    let registry = registry();

    for i in 0..5 {
        registry
            .create(
                &alice(),
                draft(&format!("Item {}", i)).visibility(Visibility::Public),
            )
            .await
            .unwrap();
    }

    let first = registry.search(&bob(), "item", None).await.unwrap();
    assert_eq!(first.len(), 5);

    // Newest first; same-millisecond creations fall back to id order.
    for pair in first.windows(2) {
        let (newer, older) = (&pair[0], &pair[1]);
        assert!(
            newer.created_at > older.created_at
                || (newer.created_at == older.created_at && newer.id > older.id)
        );
    }

    let second = registry.search(&bob(), "item", None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_access_triple_mirrors_authorization() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Guarded")).await.unwrap();

    assert_eq!(
        registry.access(&alice(), id).await.unwrap(),
        Access {
            can_view: true,
            can_edit: true,
            can_delete: true
        }
    );
    assert_eq!(registry.access(&bob(), id).await.unwrap(), Access::NONE);

    registry
        .grant(
            &alice(),
            id,
            &bob(),
            CapabilitySet::just(Capability::View).with(Capability::Edit),
        )
        .await
        .unwrap();
    let access = registry.access(&bob(), id).await.unwrap();
    assert!(access.can_view && access.can_edit && !access.can_delete);
}

#[tokio::test]
async fn test_grants_listing_is_owner_only() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Ledgered")).await.unwrap();

    registry
        .grant(&alice(), id, &carol(), CapabilitySet::just(Capability::View))
        .await
        .unwrap();
    registry
        .grant(&alice(), id, &bob(), CapabilitySet::FULL)
        .await
        .unwrap();

    let grants = registry.grants(&alice(), id).await.unwrap();
    assert_eq!(grants.len(), 2);
    // Ordered by grantee token.
    assert_eq!(grants[0].0, bob());
    assert_eq!(grants[1].0, carol());

    assert!(matches!(
        registry.grants(&bob(), id).await.unwrap_err(),
        RegistryError::Forbidden { .. }
    ));
}

#[tokio::test]
async fn test_delete_capability_without_edit() {
    let registry = registry();
    let id = registry.create(&alice(), draft("Brittle")).await.unwrap();

    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::Delete))
        .await
        .unwrap();

    // Delete does not imply Edit or View.
    assert!(matches!(
        registry
            .update(&bob(), id, ArchivePatch::new().title("Nope"))
            .await
            .unwrap_err(),
        RegistryError::Forbidden { .. }
    ));

    registry.delete(&bob(), id).await.unwrap();
    assert!(matches!(
        registry.get(&alice(), id).await.unwrap_err(),
        RegistryError::NotFound(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_yield_unique_ids() {
    let registry = Arc::new(registry());

    let mut handles = Vec::new();
    for task in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let owner = Identity::from(format!("0xowner{:02}", task));
            let mut ids = Vec::new();
            for i in 0..4 {
                ids.push(
                    registry
                        .create(&owner, draft(&format!("Item {}-{}", task, i)))
                        .await
                        .unwrap(),
                );
            }
            ids
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    let unique: std::collections::HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), 32);
    assert_eq!(registry.total_archives().await.unwrap(), 32);
}

#[tokio::test]
async fn test_registry_over_sqlite_backend() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("arca.db")).unwrap();
    let registry = Registry::new(store);

    let id = registry
        .create(&alice(), draft("Durable").category("文档"))
        .await
        .unwrap();
    registry
        .grant(&alice(), id, &bob(), CapabilitySet::just(Capability::View))
        .await
        .unwrap();

    assert_eq!(registry.get(&bob(), id).await.unwrap().title, "Durable");
    assert_eq!(registry.list_by_category("文档").await.unwrap(), vec![id]);

    registry.delete(&alice(), id).await.unwrap();
    assert!(matches!(
        registry.get(&bob(), id).await.unwrap_err(),
        RegistryError::NotFound(_)
    ));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Grant followed by revoke restores the pre-grant outcome for
        // every capability, whatever set was granted.
        #[test]
        fn prop_grant_then_revoke_restores_access(bits in 0u8..=0b111) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async move {
                let registry = Registry::new(MemoryStore::new());
                let id = registry.create(&alice(), draft("Probed")).await.unwrap();

                let before = registry.access(&bob(), id).await.unwrap();

                registry
                    .grant(&alice(), id, &bob(), CapabilitySet::from_bits(bits).unwrap())
                    .await
                    .unwrap();
                registry.revoke(&alice(), id, &bob()).await.unwrap();

                let after = registry.access(&bob(), id).await.unwrap();
                assert_eq!(before, after);
            });
        }

        // The owner's access is FULL no matter what grants exist for
        // other identities.
        #[test]
        fn prop_owner_access_is_invariant(bits in 0u8..=0b111) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async move {
                let registry = Registry::new(MemoryStore::new());
                let id = registry.create(&alice(), draft("Probed")).await.unwrap();

                registry
                    .grant(&alice(), id, &bob(), CapabilitySet::from_bits(bits).unwrap())
                    .await
                    .unwrap();

                let access = registry.access(&alice(), id).await.unwrap();
                assert!(access.can_view && access.can_edit && access.can_delete);
            });
        }
    }
}
