//! Reconciliation behavior against a scripted extractor.

use alloy::primitives::U256;

use mint_sdk::{
    refresh::ReconciliationEngine,
    store::{DescriptorQuery, DescriptorStore, MemoryDescriptorStore},
    testing::{self, StaticExtractor, TEST_COLLECTION},
    types::{MintKind, MintStage, MintStandard, MintStatus},
};

fn open_public() -> mint_sdk::types::MintDescriptor {
    testing::descriptor_fixture()
        .stage(MintStage::PublicSale)
        .kind(MintKind::Public)
        .build()
}

fn open_presale() -> mint_sdk::types::MintDescriptor {
    testing::descriptor_fixture()
        .stage(MintStage::Presale)
        .kind(MintKind::Allowlist)
        .build()
}

#[tokio::test]
async fn closes_stages_missing_from_fresh_extraction() {
    let extractor = StaticExtractor::new(MintStandard::Foundation);
    let store = MemoryDescriptorStore::new();
    store.upsert(&open_public()).await.unwrap();
    store.upsert(&open_presale()).await.unwrap();

    // Fresh extraction only returns the public stage
    extractor.set(None, vec![open_public()]);

    let engine = ReconciliationEngine::new(extractor, store);
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();

    let all = engine
        .store()
        .by_collection(
            TEST_COLLECTION,
            DescriptorQuery::standard(MintStandard::Foundation),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    for descriptor in all {
        match descriptor.kind {
            MintKind::Public => assert_eq!(descriptor.status, MintStatus::Open),
            MintKind::Allowlist => assert_eq!(descriptor.status, MintStatus::Closed),
        }
    }
}

#[tokio::test]
async fn repeated_refresh_is_stable() {
    let extractor = StaticExtractor::new(MintStandard::Foundation);
    extractor.set(None, vec![open_public(), open_presale()]);

    let engine = ReconciliationEngine::new(extractor, MemoryDescriptorStore::new());
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();

    // Identity tuples are stable, so re-running upserts in place instead
    // of accumulating duplicates, and nothing gets closed
    let all = engine
        .store()
        .by_collection(
            TEST_COLLECTION,
            DescriptorQuery::standard(MintStandard::Foundation),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|d| d.status == MintStatus::Open));
}

#[tokio::test]
async fn failed_token_scope_keeps_stale_stages() {
    let extractor = StaticExtractor::new(MintStandard::Zora).multi_token();
    let store = MemoryDescriptorStore::new();

    let token_one = testing::descriptor_fixture()
        .standard(MintStandard::Zora)
        .token_id(U256::from(1))
        .build();
    let token_two = testing::descriptor_fixture()
        .standard(MintStandard::Zora)
        .token_id(U256::from(2))
        .build();
    store.upsert(&token_one).await.unwrap();
    store.upsert(&token_two).await.unwrap();

    // Token 1 extraction fails; token 2 comes back empty
    extractor.fail(Some(U256::from(1)));
    extractor.set(Some(U256::from(2)), vec![]);

    let engine = ReconciliationEngine::new(extractor, store);
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();

    let all = engine
        .store()
        .by_collection(
            TEST_COLLECTION,
            DescriptorQuery::standard(MintStandard::Zora),
        )
        .await
        .unwrap();
    for descriptor in all {
        match descriptor.token_id {
            Some(id) if id == U256::from(1) => {
                // Stale data retained, not closed
                assert_eq!(descriptor.status, MintStatus::Open);
            }
            Some(id) if id == U256::from(2) => {
                assert_eq!(descriptor.status, MintStatus::Closed);
            }
            other => panic!("unexpected token scope {other:?}"),
        }
    }
}

#[tokio::test]
async fn token_enumeration_is_bounded() {
    let extractor = StaticExtractor::new(MintStandard::Zora).multi_token();
    extractor.set(Some(U256::from(1)), vec![]);
    extractor.set(Some(U256::from(2)), vec![]);
    let store = MemoryDescriptorStore::new();
    for id in 1..=5u64 {
        store.add_token_id(TEST_COLLECTION, U256::from(id));
    }

    let descriptor = testing::descriptor_fixture()
        .standard(MintStandard::Zora)
        .token_id(U256::from(5))
        .build();
    store.upsert(&descriptor).await.unwrap();

    // Token 5 is beyond the enumeration bound: its scope is never
    // refreshed, so its stage must not be closed
    let engine = ReconciliationEngine::new(extractor, store).with_max_token_ids(2);
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();

    let all = engine
        .store()
        .by_collection(
            TEST_COLLECTION,
            DescriptorQuery::standard(MintStandard::Zora),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, MintStatus::Open);
}

#[tokio::test]
async fn premint_stages_join_the_fresh_set() {
    let extractor = StaticExtractor::new(MintStandard::Zora).multi_token();
    let premint = testing::descriptor_fixture()
        .standard(MintStandard::Zora)
        .build();
    extractor.set_premints(vec![premint]);

    let engine = ReconciliationEngine::new(extractor, MemoryDescriptorStore::new());
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();

    let all = engine
        .store()
        .by_collection(
            TEST_COLLECTION,
            DescriptorQuery::standard(MintStandard::Zora),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].token_id, None);
}

#[tokio::test]
async fn closed_stages_are_never_deleted() {
    let extractor = StaticExtractor::new(MintStandard::Foundation);
    let store = MemoryDescriptorStore::new();
    let closed = testing::descriptor_fixture()
        .stage(MintStage::Presale)
        .kind(MintKind::Allowlist)
        .status(MintStatus::Closed)
        .build();
    store.upsert(&closed).await.unwrap();
    extractor.set(None, vec![open_public()]);

    let engine = ReconciliationEngine::new(extractor, store);
    engine.refresh_by_collection(TEST_COLLECTION).await.unwrap();

    let all = engine
        .store()
        .by_collection(
            TEST_COLLECTION,
            DescriptorQuery::standard(MintStandard::Foundation),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    let closed_again = all
        .iter()
        .find(|d| d.kind == MintKind::Allowlist)
        .expect("closed stage retained");
    assert_eq!(closed_again.status, MintStatus::Closed);
}
