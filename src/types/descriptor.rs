use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::template::TxTemplate;

/// Minting protocol an extractor speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MintStandard {
    Foundation,
    Zora,
}

/// Logical grouping of a sale stage. Multiple descriptors may share a stage
/// but differ by kind or token id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MintStage {
    PublicSale,
    Presale,
}

/// Whether filling the stage requires a merkle proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MintKind {
    Public,
    Allowlist,
}

/// Lifecycle state of a discovered stage.
///
/// `Closed` is reserved for the reconciliation diff: it marks stages that
/// were findable before and are no longer returned by extraction. The
/// extractor itself only ever assigns the other three, which reflect live
/// on-chain readability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MintStatus {
    Open,
    Closed,
    Pending,
    Ended,
}

/// Why the classifier picked a non-open status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusReason {
    SaleDisabled,
    TimeEnded,
    NotStarted,
    SupplyExhausted,
}

/// Protocol-specific auxiliary data needed to reconstruct the stage later.
///
/// Some protocols run several concurrent minter implementations per
/// collection; `minter` pins down which one produced this stage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minter: Option<Address>,
    /// Per-item protocol fee already folded into the descriptor price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<U256>,
    /// Uid of the offline-signed premint this stage was derived from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premint_uid: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintDetails {
    pub tx: TxTemplate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<MintInfo>,
}

/// A discovered sale stage: the canonical unit of mint availability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintDescriptor {
    pub collection: Address,
    pub contract: Address,
    /// Present only for token-scoped (ERC1155-style) stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<U256>,
    pub stage: MintStage,
    pub kind: MintKind,
    pub standard: MintStandard,
    pub status: MintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<StatusReason>,
    pub currency: Address,
    /// Price in the smallest unit of `currency`, protocol fee included.
    pub price: U256,
    /// Absence means uncapped, never zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mints_per_wallet: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<U256>,
    /// Inclusive unix-second bounds; absence means unbounded on that side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    /// Merkle root of the associated allowlist, iff `kind == Allowlist`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowlist_id: Option<B256>,
    pub details: MintDetails,
}

/// Identity key used by reconciliation to match old vs. new descriptors.
/// Deliberately not a synthetic id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MintIdentity {
    pub collection: Address,
    pub stage: MintStage,
    pub token_id: Option<U256>,
    pub kind: MintKind,
}

impl MintDescriptor {
    pub fn identity(&self) -> MintIdentity {
        MintIdentity {
            collection: self.collection,
            stage: self.stage,
            token_id: self.token_id,
            kind: self.kind,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == MintStatus::Open
    }
}
