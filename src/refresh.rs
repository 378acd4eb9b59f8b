//! Pull-based reconciliation of stored mint state against on-chain truth.
//!
//! A "stage closed" condition is often implicit (a time window elapsed,
//! supply ran out) rather than signaled by an on-chain event, so stored
//! descriptors are periodically re-derived: extraction runs again, results
//! are upserted, and any previously stored stage that the fresh extraction
//! no longer returns is marked closed. Nothing is ever deleted, and a run
//! that fails midway leaves the not-yet-updated descriptors untouched.

use std::collections::HashSet;

use alloy::primitives::{Address, U256};
use futures::future;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::{
    detector::MintExtractor,
    error::MintError,
    store::{DescriptorQuery, DescriptorStore},
    types::{MintDescriptor, MintIdentity, MintStatus},
};

/// Default bound on enumerated token ids for multi-token collections.
const DEFAULT_MAX_TOKEN_IDS: usize = 1000;

/// Default cap on concurrent per-token extractions; each extraction fans
/// out into several RPC reads of its own.
const DEFAULT_EXTRACTION_CONCURRENCY: usize = 8;

pub struct ReconciliationEngine<E, S> {
    extractor: E,
    store: S,
    max_token_ids: usize,
    extraction_concurrency: usize,
}

impl<E, S> ReconciliationEngine<E, S>
where
    E: MintExtractor,
    S: DescriptorStore,
{
    pub fn new(extractor: E, store: S) -> Self {
        Self {
            extractor,
            store,
            max_token_ids: DEFAULT_MAX_TOKEN_IDS,
            extraction_concurrency: DEFAULT_EXTRACTION_CONCURRENCY,
        }
    }

    /// Bounds the per-collection token enumeration (default: 1000).
    pub fn with_max_token_ids(mut self, max_token_ids: usize) -> Self {
        self.max_token_ids = max_token_ids;
        self
    }

    /// Caps concurrent per-token extractions (default: 8). Use if the
    /// RPC provider rate-limits the fan-out.
    pub fn with_extraction_concurrency(mut self, extraction_concurrency: usize) -> Self {
        self.extraction_concurrency = extraction_concurrency.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Re-runs extraction for the collection and reconciles stored state:
    /// fresh stages are upserted, and stages that disappeared from their
    /// just-refreshed token scope are closed.
    ///
    /// Each token scope's failure is isolated: its stale descriptors keep
    /// their last known status and the remaining scopes still refresh.
    pub async fn refresh_by_collection(&self, collection: Address) -> Result<(), MintError> {
        let existing = self
            .store
            .by_collection(collection, DescriptorQuery::standard(self.extractor.standard()))
            .await?;

        let scopes: Vec<Option<U256>> = if self.extractor.is_multi_token() {
            self.store
                .token_ids(collection, self.max_token_ids)
                .await?
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None]
        };

        let semaphore = Semaphore::new(self.extraction_concurrency);
        let extractions = future::join_all(scopes.into_iter().map(|scope| {
            let extractor = &self.extractor;
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                (
                    scope,
                    extractor.extract_by_collection(collection, scope).await,
                )
            }
        }))
        .await;

        let mut refreshed_scopes: HashSet<Option<U256>> = HashSet::new();
        let mut fresh: Vec<MintDescriptor> = Vec::new();
        for (scope, result) in extractions {
            match result {
                Ok(descriptors) => {
                    refreshed_scopes.insert(scope);
                    fresh.extend(descriptors);
                }
                Err(err) => {
                    warn!(
                        %collection, token_id = ?scope, %err,
                        "extraction failed, keeping stale stages"
                    );
                }
            }
        }

        // Offline-signed premint stages join the fresh set when the
        // protocol supports the concept
        match self.extractor.premints(collection).await {
            Ok(premints) => fresh.extend(premints),
            Err(err) => warn!(%collection, %err, "premint discovery failed"),
        }

        let fresh_identities: HashSet<MintIdentity> =
            fresh.iter().map(|d| d.identity()).collect();
        for descriptor in &fresh {
            self.store.upsert(descriptor).await?;
        }

        for mut stale in existing {
            if stale.status == MintStatus::Closed
                || !refreshed_scopes.contains(&stale.token_id)
                || fresh_identities.contains(&stale.identity())
            {
                continue;
            }
            stale.status = MintStatus::Closed;
            stale.status_reason = None;
            self.store.upsert(&stale).await?;
        }

        Ok(())
    }
}
