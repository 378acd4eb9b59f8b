//! Allowlist persistence and proof generation.
//!
//! Allowlists are immutable once created and keyed by their merkle root:
//! recomputing the same input set always yields the same root, so a root
//! existence check is a safe guard against recomputation, and concurrent
//! creation races resolve by idempotence rather than locking.

pub mod merkle;

use alloy::primitives::{Address, B256};
use dashmap::DashMap;

use crate::{
    error::{MintError, StoreError},
    types::{AllowlistItem, ProofValue},
};

/// Persistence seam for per-merkle-root allowlist entries.
///
/// Callers of [`create`](Self::create) must verify that
/// [`merkle::root`] of the items equals the key root first; the store does
/// not recheck, and holding items inconsistent with the root used on-chain
/// would silently break proof verification for end users.
pub trait AllowlistStore: Send + Sync {
    fn exists(
        &self,
        root: B256,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// No-op (not an error) when the root already exists.
    fn create(
        &self,
        root: B256,
        items: Vec<AllowlistItem>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get(
        &self,
        root: B256,
    ) -> impl Future<Output = Result<Option<Vec<AllowlistItem>>, StoreError>> + Send;
}

/// In-memory allowlist store, also the default for tests.
#[derive(Debug, Default)]
pub struct MemoryAllowlistStore {
    lists: DashMap<B256, Vec<AllowlistItem>>,
}

impl MemoryAllowlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AllowlistStore for MemoryAllowlistStore {
    async fn exists(&self, root: B256) -> Result<bool, StoreError> {
        Ok(self.lists.contains_key(&root))
    }

    async fn create(&self, root: B256, items: Vec<AllowlistItem>) -> Result<(), StoreError> {
        self.lists.entry(root).or_insert(items);
        Ok(())
    }

    async fn get(&self, root: B256) -> Result<Option<Vec<AllowlistItem>>, StoreError> {
        Ok(self.lists.get(&root).map(|entry| entry.value().clone()))
    }
}

/// Looks up `address` on the allowlist identified by `root` and generates
/// its merkle proof along with the entry's terms.
///
/// Proof computation is linear in the allowlist size; callers serving many
/// fills should cache per `(root, address)` with a short TTL.
pub async fn proof_for_address<S: AllowlistStore>(
    store: &S,
    root: B256,
    address: Address,
) -> Result<ProofValue, MintError> {
    let items = store
        .get(root)
        .await?
        .ok_or(MintError::AllowlistNotFound(root))?;
    let item = items
        .iter()
        .find(|item| item.address == address)
        .ok_or(MintError::NotOnAllowlist { root, address })?;
    let proof = merkle::proof(&items, address)
        .ok_or(MintError::NotOnAllowlist { root, address })?;
    Ok(ProofValue {
        proof,
        price: item.price,
        max_mints: item.max_mints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn entries() -> Vec<AllowlistItem> {
        vec![
            AllowlistItem::address_only(address!("0x0000000000000000000000000000000000000001")),
            AllowlistItem::address_only(address!("0x0000000000000000000000000000000000000002")),
        ]
    }

    #[tokio::test]
    async fn create_is_idempotent() {
        let store = MemoryAllowlistStore::new();
        let items = entries();
        let root = merkle::root(&items);

        assert!(!store.exists(root).await.unwrap());
        store.create(root, items.clone()).await.unwrap();
        assert!(store.exists(root).await.unwrap());

        // Second create with different content must not clobber
        store
            .create(root, vec![items[0].clone()])
            .await
            .unwrap();
        assert_eq!(store.get(root).await.unwrap(), Some(items));
    }

    #[tokio::test]
    async fn proof_for_missing_root_fails() {
        let store = MemoryAllowlistStore::new();
        let err = proof_for_address(&store, B256::ZERO, Address::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::AllowlistNotFound(_)));
    }

    #[tokio::test]
    async fn proof_for_non_member_fails() {
        let store = MemoryAllowlistStore::new();
        let items = entries();
        let root = merkle::root(&items);
        store.create(root, items).await.unwrap();

        let outsider = address!("0x0000000000000000000000000000000000000009");
        let err = proof_for_address(&store, root, outsider).await.unwrap_err();
        assert!(matches!(err, MintError::NotOnAllowlist { .. }));
    }

    #[tokio::test]
    async fn proof_for_member_verifies() {
        let store = MemoryAllowlistStore::new();
        let items = entries();
        let root = merkle::root(&items);
        store.create(root, items.clone()).await.unwrap();

        let member = items[0].address;
        let value = proof_for_address(&store, root, member).await.unwrap();
        assert!(merkle::verify(&value.proof, root, member));
    }
}
