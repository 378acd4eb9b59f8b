//! Protocol mint-config extractors.
//!
//! One extractor per supported minting protocol. Each inspects on-chain
//! contract state to discover currently configured sale stages and, for
//! historical reconstruction, decodes transaction calldata to recover the
//! identifying parameters (token id, minter address) that on-chain reads
//! alone cannot infer.
//!
//! A failed read against one protocol version is absence of that version's
//! configuration, not an error; extractors keep trying the other versions
//! and sale types.

mod foundation;
mod zora;

pub use foundation::FoundationExtractor;
pub use zora::ZoraExtractor;

use alloy::{
    dyn_abi::DynSolValue,
    eips::BlockId,
    primitives::{Address, U256},
    providers::Provider,
};

use crate::{
    error::MintError,
    template::FillContext,
    types::{MintDescriptor, MintStandard, ParamKind, TxParam, TxRequest},
};

pub trait MintExtractor: Send + Sync {
    fn standard(&self) -> MintStandard;

    /// Whether this protocol's stages are token-scoped (ERC1155-style).
    fn is_multi_token(&self) -> bool;

    /// Discovers currently configured stages from read-only on-chain
    /// calls. Absent configuration yields an empty result.
    fn extract_by_collection(
        &self,
        collection: Address,
        token_id: Option<U256>,
    ) -> impl Future<Output = Result<Vec<MintDescriptor>, MintError>> + Send;

    /// Recovers identifying parameters from a historical transaction's
    /// calldata, then delegates to [`Self::extract_by_collection`].
    /// Unrecognized or malformed calldata yields an empty result.
    fn extract_by_tx(
        &self,
        collection: Address,
        tx: &TxRequest,
    ) -> impl Future<Output = Result<Vec<MintDescriptor>, MintError>> + Send;

    /// Offline-signed mint configs not yet materialized on-chain, for
    /// protocols that support the concept.
    fn premints(
        &self,
        collection: Address,
    ) -> impl Future<Output = Result<Vec<MintDescriptor>, MintError>> + Send;
}

/// Static dispatch over the supported extractors; native async trait
/// methods are not object-safe, so reconciliation picks a variant by the
/// stored standard.
pub enum AnyExtractor<FE, ZE> {
    Foundation(FE),
    Zora(ZE),
}

impl<FE: MintExtractor, ZE: MintExtractor> MintExtractor for AnyExtractor<FE, ZE> {
    fn standard(&self) -> MintStandard {
        match self {
            Self::Foundation(e) => e.standard(),
            Self::Zora(e) => e.standard(),
        }
    }

    fn is_multi_token(&self) -> bool {
        match self {
            Self::Foundation(e) => e.is_multi_token(),
            Self::Zora(e) => e.is_multi_token(),
        }
    }

    async fn extract_by_collection(
        &self,
        collection: Address,
        token_id: Option<U256>,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        match self {
            Self::Foundation(e) => e.extract_by_collection(collection, token_id).await,
            Self::Zora(e) => e.extract_by_collection(collection, token_id).await,
        }
    }

    async fn extract_by_tx(
        &self,
        collection: Address,
        tx: &TxRequest,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        match self {
            Self::Foundation(e) => e.extract_by_tx(collection, tx).await,
            Self::Zora(e) => e.extract_by_tx(collection, tx).await,
        }
    }

    async fn premints(&self, collection: Address) -> Result<Vec<MintDescriptor>, MintError> {
        match self {
            Self::Foundation(e) => e.premints(collection).await,
            Self::Zora(e) => e.premints(collection).await,
        }
    }
}

/// Resolves a protocol-specific `Custom` slot at fill time.
pub(crate) fn custom_value(
    param: &TxParam,
    ctx: &FillContext<'_>,
) -> Result<DynSolValue, MintError> {
    debug_assert_eq!(param.kind, ParamKind::Custom);
    match ctx.descriptor.standard {
        MintStandard::Zora => zora::minter_arguments(ctx),
        MintStandard::Foundation => Err(MintError::Template(
            "foundation templates carry no custom slots".to_string(),
        )),
    }
}

/// Head block number and timestamp; extraction classifies stage lifecycle
/// against chain time, not wall-clock time.
async fn head_instant<P: Provider>(provider: &P) -> Result<(u64, u64), MintError> {
    let header = provider
        .get_block(BlockId::latest())
        .await
        .map_err(MintError::from)?
        .map(|b| b.into_header())
        .ok_or_else(|| MintError::InvalidRequest("head block not found".to_string()))?;
    Ok((header.number, header.timestamp))
}

/// Zeroed time bound means unbounded on that side; some protocols also use
/// the max value as the open-ended sentinel.
fn time_bound(value: u64) -> Option<u64> {
    (value != 0 && value != u64::MAX).then_some(value)
}

fn wallet_cap(value: u64) -> Option<u64> {
    (value != 0).then_some(value)
}

fn supply_cap(value: U256) -> Option<U256> {
    (!value.is_zero() && value != U256::MAX).then_some(value)
}
