//! NFT mint detection and calldata templating SDK.
//!
//! # Overview
//!
//! Discovers currently active mint stages ("public sale", "presale") for
//! collections using supported minting protocols, and encodes each stage as
//! a protocol-agnostic transaction template with typed parameter slots.
//!
//! Use [`detector::FoundationExtractor`] / [`detector::ZoraExtractor`]
//! (or [`detector::AnyExtractor`] for dispatch by standard) to extract
//! [`types::MintDescriptor`]s from on-chain state or from a historical
//! transaction's calldata.
//!
//! Use [`refresh::ReconciliationEngine`] to keep stored descriptors in sync
//! with on-chain truth: stages that stop being discoverable are marked
//! closed, never deleted.
//!
//! Use [`template::TxDataBuilder`] at fill time to turn a descriptor plus a
//! recipient and quantity into ready-to-send calldata, resolving allowlist
//! merkle proofs where the stage requires them.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Allowlist stages are discovered only within the configured log scan
//!   window; older sales need a wider [`Chain::custom`] window.
//!
//! * Proof lookups recompute the merkle tree per call. Callers serving
//!   many fills against large allowlists should cache per `(root, address)`
//!   with a short TTL.

pub mod abi;
pub mod allowlist;
pub mod detector;
pub mod error;
pub mod fetch;
pub mod refresh;
pub mod status;
pub mod store;
pub mod template;
pub mod testing;
pub mod types;

use alloy::primitives::{Address, address};

/// Default number of blocks to scan back from head when looking for
/// allowlist configuration events.
const DEFAULT_SCAN_WINDOW: u64 = 500_000;

/// Chain the supported minting protocols are deployed on.
#[derive(Clone, Debug)]
pub struct Chain {
    chain_id: u64,
    foundation_drop_market: Address,
    zora_fixed_price_minters: Vec<Address>,
    zora_merkle_minters: Vec<Address>,
    zora_erc20_minters: Vec<Address>,
    scan_window: u64,
    default_referrer: Option<Address>,
}

impl Chain {
    /// Ethereum mainnet deployments. The Zora minter strategies are
    /// deployed deterministically, so the same addresses hold across the
    /// chains Zora supports.
    pub fn mainnet() -> Self {
        Self {
            chain_id: 1,
            foundation_drop_market: address!("0x53F451165Ba6fdbe39A134673d13948261B2334A"),
            zora_fixed_price_minters: vec![address!(
                "0x04E2516A2c207E84a1839755675dfd8eF6302F0a"
            )],
            zora_merkle_minters: vec![address!("0xf48172CA3B6068B20eE4917Eb27b5472f1f272C7")],
            zora_erc20_minters: vec![address!("0x777777E8850d8D6d98De2B5f64fae401F96eFF31")],
            scan_window: DEFAULT_SCAN_WINDOW,
            default_referrer: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn custom(
        chain_id: u64,
        foundation_drop_market: Address,
        zora_fixed_price_minters: Vec<Address>,
        zora_merkle_minters: Vec<Address>,
        zora_erc20_minters: Vec<Address>,
        scan_window: u64,
        default_referrer: Option<Address>,
    ) -> Self {
        Self {
            chain_id,
            foundation_drop_market,
            zora_fixed_price_minters,
            zora_merkle_minters,
            zora_erc20_minters,
            scan_window,
            default_referrer,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn foundation_drop_market(&self) -> Address {
        self.foundation_drop_market
    }

    pub fn zora_fixed_price_minters(&self) -> &[Address] {
        &self.zora_fixed_price_minters
    }

    pub fn zora_merkle_minters(&self) -> &[Address] {
        &self.zora_merkle_minters
    }

    pub fn zora_erc20_minters(&self) -> &[Address] {
        &self.zora_erc20_minters
    }

    pub fn scan_window(&self) -> u64 {
        self.scan_window
    }

    pub fn default_referrer(&self) -> Option<Address> {
        self.default_referrer
    }
}
