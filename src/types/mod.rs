mod descriptor;
mod template;

pub use descriptor::*;
pub use template::*;

use alloy::primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Sentinel currency address for the chain's native gas token.
pub const NATIVE_CURRENCY: Address = Address::ZERO;

/// Number of tokens minted by a single fill.
pub type Quantity = u64;

/// Target and calldata of a historical transaction, as fed to
/// [`crate::detector::MintExtractor::extract_by_tx`].
#[derive(Clone, Debug)]
pub struct TxRequest {
    pub to: Address,
    pub input: Bytes,
}

impl TxRequest {
    pub fn new(to: Address, input: Bytes) -> Self {
        Self { to, input }
    }
}

/// Entry of an allowlist, keyed by the allowlist's merkle root.
///
/// `price` is the on-chain unit price the entry is entitled to;
/// `actual_price` additionally includes the protocol mint fee. Absent
/// `max_mints` means the entry is uncapped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistItem {
    pub address: Address,
    pub price: Option<U256>,
    pub actual_price: Option<U256>,
    pub max_mints: Option<u64>,
}

impl AllowlistItem {
    /// Entry with no per-address terms (price comes from the sale config).
    pub fn address_only(address: Address) -> Self {
        Self {
            address,
            price: None,
            actual_price: None,
            max_mints: None,
        }
    }
}

/// Merkle proof for an allowlist member, along with the member's terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofValue {
    pub proof: Vec<B256>,
    pub price: Option<U256>,
    pub max_mints: Option<u64>,
}
