//! Test fixtures and scripted collaborators.
//!
//! [`descriptor_fixture`] builds descriptor instances with controlled
//! values for unit testing template resolution and reconciliation.
//! [`StaticExtractor`] replays scripted extraction results so the
//! reconciliation engine can be exercised without a chain.

use alloy::primitives::{Address, B256, U256, address};
use dashmap::{DashMap, DashSet};

use crate::{
    detector::MintExtractor,
    error::MintError,
    types::{
        MintDescriptor, MintDetails, MintKind, MintStage, MintStandard, MintStatus, TxParam,
        TxRequest, TxTemplate,
    },
};

pub mod abi {
    alloy::sol!(
        /// Minimal minter surface for template round-trip tests: one slot
        /// of each common kind in a known order.
        #[derive(Debug)]
        interface ITestMinter {
            struct MintConfig {
                address to;
                uint256 qty;
            }

            function mint(
                address collection,
                uint256 quantity,
                address recipient,
                address referrer
            ) external payable;

            function mintAllowlist(
                address collection,
                uint256 quantity,
                address recipient,
                bytes32[] proof
            ) external payable;

            function mintStruct(MintConfig config) external payable;
        }
    );
}

pub const TEST_COLLECTION: Address = address!("0xC011ec7107c0113c7107c0113c7107C0113C7107");

/// Descriptor builder with usable defaults: an open Foundation-standard
/// public stage priced in the native currency, templated against
/// [`abi::ITestMinter`].
pub fn descriptor_fixture() -> DescriptorBuilder {
    DescriptorBuilder::default()
}

pub struct DescriptorBuilder {
    descriptor: MintDescriptor,
}

impl Default for DescriptorBuilder {
    fn default() -> Self {
        use alloy::sol_types::SolCall;

        let tx = TxTemplate::new(
            TEST_COLLECTION,
            abi::ITestMinter::mintCall::SELECTOR.into(),
            vec![
                TxParam::contract("address", TEST_COLLECTION),
                TxParam::quantity("uint256"),
                TxParam::recipient("address"),
                TxParam::referrer("address"),
            ],
        );
        Self {
            descriptor: MintDescriptor {
                collection: TEST_COLLECTION,
                contract: TEST_COLLECTION,
                token_id: None,
                stage: MintStage::PublicSale,
                kind: MintKind::Public,
                standard: MintStandard::Foundation,
                status: MintStatus::Open,
                status_reason: None,
                currency: crate::types::NATIVE_CURRENCY,
                price: U256::ZERO,
                max_mints_per_wallet: None,
                max_supply: None,
                start_time: None,
                end_time: None,
                allowlist_id: None,
                details: MintDetails { tx, info: None },
            },
        }
    }
}

impl DescriptorBuilder {
    pub fn collection(mut self, collection: Address) -> Self {
        self.descriptor.collection = collection;
        self.descriptor.contract = collection;
        self
    }

    pub fn token_id(mut self, token_id: U256) -> Self {
        self.descriptor.token_id = Some(token_id);
        self
    }

    pub fn stage(mut self, stage: MintStage) -> Self {
        self.descriptor.stage = stage;
        self
    }

    pub fn kind(mut self, kind: MintKind) -> Self {
        self.descriptor.kind = kind;
        self
    }

    pub fn standard(mut self, standard: MintStandard) -> Self {
        self.descriptor.standard = standard;
        self
    }

    pub fn status(mut self, status: MintStatus) -> Self {
        self.descriptor.status = status;
        self
    }

    pub fn currency(mut self, currency: Address) -> Self {
        self.descriptor.currency = currency;
        self
    }

    pub fn price(mut self, price: U256) -> Self {
        self.descriptor.price = price;
        self
    }

    pub fn allowlist_id(mut self, root: B256) -> Self {
        self.descriptor.allowlist_id = Some(root);
        self
    }

    pub fn times(mut self, start: Option<u64>, end: Option<u64>) -> Self {
        self.descriptor.start_time = start;
        self.descriptor.end_time = end;
        self
    }

    pub fn template(mut self, tx: TxTemplate) -> Self {
        self.descriptor.details.tx = tx;
        self
    }

    pub fn build(self) -> MintDescriptor {
        self.descriptor
    }
}

/// Extractor replaying scripted per-scope results.
pub struct StaticExtractor {
    standard: MintStandard,
    multi_token: bool,
    by_scope: DashMap<Option<U256>, Vec<MintDescriptor>>,
    failing_scopes: DashSet<Option<U256>>,
    premints: DashMap<(), Vec<MintDescriptor>>,
}

impl StaticExtractor {
    pub fn new(standard: MintStandard) -> Self {
        Self {
            standard,
            multi_token: false,
            by_scope: DashMap::new(),
            failing_scopes: DashSet::new(),
            premints: DashMap::new(),
        }
    }

    pub fn multi_token(mut self) -> Self {
        self.multi_token = true;
        self
    }

    /// Scripts the extraction result for a token scope.
    pub fn set(&self, scope: Option<U256>, descriptors: Vec<MintDescriptor>) {
        self.failing_scopes.remove(&scope);
        self.by_scope.insert(scope, descriptors);
    }

    /// Scripts an extraction failure for a token scope.
    pub fn fail(&self, scope: Option<U256>) {
        self.by_scope.remove(&scope);
        self.failing_scopes.insert(scope);
    }

    pub fn set_premints(&self, descriptors: Vec<MintDescriptor>) {
        self.premints.insert((), descriptors);
    }
}

impl MintExtractor for StaticExtractor {
    fn standard(&self) -> MintStandard {
        self.standard
    }

    fn is_multi_token(&self) -> bool {
        self.multi_token
    }

    async fn extract_by_collection(
        &self,
        _collection: Address,
        token_id: Option<U256>,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        if self.failing_scopes.contains(&token_id) {
            return Err(MintError::Transport("scripted failure".to_string()));
        }
        Ok(self
            .by_scope
            .get(&token_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn extract_by_tx(
        &self,
        collection: Address,
        _tx: &TxRequest,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        self.extract_by_collection(collection, None).await
    }

    async fn premints(&self, _collection: Address) -> Result<Vec<MintDescriptor>, MintError> {
        Ok(self
            .premints
            .get(&())
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
