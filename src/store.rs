//! Descriptor persistence seam.
//!
//! The surrounding system owns the real relational store; the engine only
//! needs upsert, a filtered per-collection read, and token-id enumeration.
//! [`MemoryDescriptorStore`] backs tests and standalone use.

use std::collections::BTreeSet;

use alloy::primitives::{Address, U256};
use dashmap::DashMap;

use crate::{
    error::StoreError,
    types::{MintDescriptor, MintIdentity, MintStandard, MintStatus},
};

/// Filter for [`DescriptorStore::by_collection`].
#[derive(Clone, Copy, Debug)]
pub struct DescriptorQuery {
    pub standard: MintStandard,
    pub status: Option<MintStatus>,
    pub token_id: Option<U256>,
}

impl DescriptorQuery {
    pub fn standard(standard: MintStandard) -> Self {
        Self {
            standard,
            status: None,
            token_id: None,
        }
    }

    pub fn with_status(mut self, status: MintStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_token_id(mut self, token_id: U256) -> Self {
        self.token_id = Some(token_id);
        self
    }
}

pub trait DescriptorStore: Send + Sync {
    /// Creates or replaces the descriptor matched by its identity tuple.
    fn upsert(
        &self,
        descriptor: &MintDescriptor,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn by_collection(
        &self,
        collection: Address,
        query: DescriptorQuery,
    ) -> impl Future<Output = Result<Vec<MintDescriptor>, StoreError>> + Send;

    /// Known token ids for a contract, ascending, at most `limit`.
    fn token_ids(
        &self,
        contract: Address,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<U256>, StoreError>> + Send;
}

/// In-memory descriptor store keyed by identity tuple.
#[derive(Debug, Default)]
pub struct MemoryDescriptorStore {
    descriptors: DashMap<MintIdentity, MintDescriptor>,
    token_ids: DashMap<Address, BTreeSet<U256>>,
}

impl MemoryDescriptorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token id the way the surrounding indexer's token table
    /// would.
    pub fn add_token_id(&self, contract: Address, token_id: U256) {
        self.token_ids.entry(contract).or_default().insert(token_id);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DescriptorStore for MemoryDescriptorStore {
    async fn upsert(&self, descriptor: &MintDescriptor) -> Result<(), StoreError> {
        if let Some(token_id) = descriptor.token_id {
            self.add_token_id(descriptor.contract, token_id);
        }
        self.descriptors
            .insert(descriptor.identity(), descriptor.clone());
        Ok(())
    }

    async fn by_collection(
        &self,
        collection: Address,
        query: DescriptorQuery,
    ) -> Result<Vec<MintDescriptor>, StoreError> {
        Ok(self
            .descriptors
            .iter()
            .filter(|entry| {
                let d = entry.value();
                d.collection == collection
                    && d.standard == query.standard
                    && query.status.is_none_or(|s| d.status == s)
                    && query.token_id.is_none_or(|t| d.token_id == Some(t))
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn token_ids(&self, contract: Address, limit: usize) -> Result<Vec<U256>, StoreError> {
        Ok(self
            .token_ids
            .get(&contract)
            .map(|set| set.iter().take(limit).copied().collect())
            .unwrap_or_default())
    }
}
