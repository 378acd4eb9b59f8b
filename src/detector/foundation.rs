//! Foundation fixed-price drop extractor (ERC721).
//!
//! Sales are configured on a shared drop-market contract rather than the
//! collection itself. Two market revisions are live concurrently: the V2
//! market exposes a per-NFT mint fee through `getFixedPriceSaleV2` and must
//! be filled through `mintFromFixedPriceSaleV2`; collections still on the
//! original market fall back to the V1 accessor/entrypoint pair.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::Filter,
    sol_types::{SolCall, SolEvent},
};
use tracing::{trace, warn};

use super::{MintExtractor, head_instant, time_bound, wallet_cap};
use crate::{
    Chain,
    abi::foundation::INFTDropMarket::{
        self, INFTDropMarketInstance, getFixedPriceSaleReturn, getFixedPriceSaleV2Return,
    },
    allowlist::{AllowlistStore, merkle},
    error::MintError,
    fetch::AllowlistFetcher,
    status::{self, SaleCounters},
    types::{
        MintDescriptor, MintDetails, MintInfo, MintKind, MintStage, MintStandard, MintStatus,
        NATIVE_CURRENCY, TxParam, TxRequest, TxTemplate,
    },
};

/// Which market revision the sale was discovered through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaleVersion {
    V1,
    V2,
}

/// Mint entrypoints recognized by [`decode_mint_call`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoundationMintCall {
    FixedPriceSale,
    FixedPriceSaleV2,
    EarlyAccessAllowlist,
}

/// Normalized fixed-price sale terms across both market revisions.
#[derive(Clone, Debug)]
struct SaleTerms {
    price: U256,
    limit_per_account: U256,
    available: U256,
    market_can_mint: bool,
    general_start: u64,
    early_start: u64,
    fee: U256,
    version: SaleVersion,
}

impl SaleTerms {
    fn from_v1(ret: getFixedPriceSaleReturn) -> Self {
        Self {
            price: ret.price,
            limit_per_account: ret.limitPerAccount,
            available: ret.numberOfTokensAvailableToMint,
            market_can_mint: ret.marketCanMint,
            general_start: ret.generalAvailabilityStartTime.saturating_to(),
            early_start: ret.earlyAccessStartTime.saturating_to(),
            fee: U256::ZERO,
            version: SaleVersion::V1,
        }
    }

    fn from_v2(ret: getFixedPriceSaleV2Return) -> Self {
        Self {
            price: ret.price,
            limit_per_account: ret.limitPerAccount,
            available: ret.numberOfTokensAvailableToMint,
            market_can_mint: ret.marketCanMint,
            general_start: ret.generalAvailabilityStartTime.saturating_to(),
            early_start: ret.earlyAccessStartTime.saturating_to(),
            fee: ret.mintFeePerNftInWei,
            version: SaleVersion::V2,
        }
    }

    /// Effective price: on-chain base price plus the protocol fee for a
    /// single mint.
    fn effective_price(&self) -> U256 {
        self.price.saturating_add(self.fee)
    }
}

pub struct FoundationExtractor<P, F, A> {
    chain: Chain,
    provider: P,
    market: INFTDropMarketInstance<P>,
    fetcher: F,
    allowlists: A,
}

impl<P, F, A> FoundationExtractor<P, F, A>
where
    P: Provider + Clone,
    F: AllowlistFetcher,
    A: AllowlistStore,
{
    pub fn new(chain: &Chain, provider: P, fetcher: F, allowlists: A) -> Self {
        Self {
            market: INFTDropMarket::new(chain.foundation_drop_market(), provider.clone()),
            chain: chain.clone(),
            provider,
            fetcher,
            allowlists,
        }
    }

    /// Probes the V2 accessor first; each failed probe is absence of that
    /// revision's configuration, not an error.
    async fn sale_terms(&self, collection: Address) -> Option<SaleTerms> {
        match self.market.getFixedPriceSaleV2(collection).call().await {
            Ok(ret) => return Some(SaleTerms::from_v2(ret)),
            Err(err) => {
                trace!(%collection, %err, "no V2 fixed-price sale, probing V1");
            }
        }
        match self.market.getFixedPriceSale(collection).call().await {
            Ok(ret) => Some(SaleTerms::from_v1(ret)),
            Err(err) => {
                trace!(%collection, %err, "no fixed-price sale configured");
                None
            }
        }
    }

    fn public_descriptor(&self, collection: Address, terms: &SaleTerms, now: u64) -> MintDescriptor {
        let selector = match terms.version {
            SaleVersion::V1 => INFTDropMarket::mintFromFixedPriceSaleCall::SELECTOR,
            SaleVersion::V2 => INFTDropMarket::mintFromFixedPriceSaleV2Call::SELECTOR,
        };
        let tx = TxTemplate::new(
            self.chain.foundation_drop_market(),
            selector.into(),
            vec![
                TxParam::contract("address", collection),
                TxParam::quantity("uint16"),
                TxParam::referrer("address"),
            ],
        );
        let mut descriptor = MintDescriptor {
            collection,
            contract: collection,
            token_id: None,
            stage: MintStage::PublicSale,
            kind: MintKind::Public,
            standard: MintStandard::Foundation,
            status: MintStatus::Open,
            status_reason: None,
            currency: NATIVE_CURRENCY,
            price: terms.effective_price(),
            max_mints_per_wallet: wallet_cap(terms.limit_per_account.saturating_to()),
            max_supply: None,
            start_time: time_bound(terms.general_start),
            end_time: None,
            allowlist_id: None,
            details: MintDetails {
                tx,
                info: Some(MintInfo {
                    fee: Some(terms.fee),
                    ..Default::default()
                }),
            },
        };
        status::apply(
            &mut descriptor,
            &SaleCounters {
                disabled: !terms.market_can_mint,
                minted: None,
                remaining: Some(terms.available),
            },
            now,
        );
        descriptor
    }

    /// Early-access stage, discoverable only when the seller attached a
    /// merkle root on-chain. The off-chain leaf set is untrusted: its
    /// recomputed root must match the on-chain root or the stage is
    /// dropped.
    async fn presale_descriptor(
        &self,
        collection: Address,
        terms: &SaleTerms,
        head_block: u64,
        now: u64,
    ) -> Result<Option<MintDescriptor>, MintError> {
        let Some(early_start) = time_bound(terms.early_start) else {
            return Ok(None);
        };

        let filter = Filter::new()
            .address(self.chain.foundation_drop_market())
            .event_signature(INFTDropMarket::AddMerkleRootToFixedPriceSale::SIGNATURE_HASH)
            .topic1(collection.into_word())
            .from_block(head_block.saturating_sub(self.chain.scan_window()))
            .to_block(head_block);
        let logs = self.provider.get_logs(&filter).await.map_err(MintError::from)?;
        let Some(log) = logs.last() else {
            return Ok(None);
        };
        let event = INFTDropMarket::AddMerkleRootToFixedPriceSale::decode_log(&log.inner)
            .map_err(MintError::from)?
            .data;
        let root = event.merkleRoot;

        if !self.allowlists.exists(root).await? {
            let mut items = self.fetcher.fetch_tree_uri(&event.merkleTreeUri).await?;
            let computed = merkle::root(&items);
            if computed != root {
                warn!(
                    %collection, expected = %root, %computed,
                    "fetched allowlist does not match on-chain root, dropping early-access stage"
                );
                return Ok(None);
            }
            for item in &mut items {
                item.price = Some(terms.price);
                item.actual_price = Some(terms.effective_price());
            }
            self.allowlists.create(root, items).await?;
        }

        let tx = TxTemplate::new(
            self.chain.foundation_drop_market(),
            INFTDropMarket::mintFromFixedPriceSaleWithEarlyAccessAllowlistCall::SELECTOR.into(),
            vec![
                TxParam::contract("address", collection),
                TxParam::quantity("uint256"),
                TxParam::referrer("address"),
                TxParam::allowlist("bytes32[]"),
            ],
        );
        let mut descriptor = MintDescriptor {
            collection,
            contract: collection,
            token_id: None,
            stage: MintStage::Presale,
            kind: MintKind::Allowlist,
            standard: MintStandard::Foundation,
            status: MintStatus::Open,
            status_reason: None,
            currency: NATIVE_CURRENCY,
            price: terms.effective_price(),
            max_mints_per_wallet: wallet_cap(terms.limit_per_account.saturating_to()),
            max_supply: None,
            start_time: Some(early_start),
            // Early access closes once general availability opens
            end_time: time_bound(terms.general_start),
            allowlist_id: Some(root),
            details: MintDetails {
                tx,
                info: Some(MintInfo {
                    fee: Some(terms.fee),
                    ..Default::default()
                }),
            },
        };
        status::apply(
            &mut descriptor,
            &SaleCounters {
                disabled: !terms.market_can_mint,
                minted: None,
                remaining: Some(terms.available),
            },
            now,
        );
        Ok(Some(descriptor))
    }
}

impl<P, F, A> MintExtractor for FoundationExtractor<P, F, A>
where
    P: Provider + Clone,
    F: AllowlistFetcher,
    A: AllowlistStore,
{
    fn standard(&self) -> MintStandard {
        MintStandard::Foundation
    }

    fn is_multi_token(&self) -> bool {
        false
    }

    async fn extract_by_collection(
        &self,
        collection: Address,
        _token_id: Option<U256>,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        let Some(terms) = self.sale_terms(collection).await else {
            return Ok(vec![]);
        };
        let (head_block, now) = head_instant(&self.provider).await?;

        let mut descriptors = vec![self.public_descriptor(collection, &terms, now)];
        if let Some(presale) = self
            .presale_descriptor(collection, &terms, head_block, now)
            .await?
        {
            descriptors.push(presale);
        }
        Ok(descriptors)
    }

    async fn extract_by_tx(
        &self,
        collection: Address,
        tx: &TxRequest,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        if tx.to != self.chain.foundation_drop_market() {
            return Ok(vec![]);
        }
        match decode_mint_call(&tx.input) {
            Some(_) => self.extract_by_collection(collection, None).await,
            None => Ok(vec![]),
        }
    }

    async fn premints(&self, _collection: Address) -> Result<Vec<MintDescriptor>, MintError> {
        Ok(vec![])
    }
}

/// Classifies calldata against the market's mint entrypoints. Historical
/// transactions are untrusted input: the full call must decode, not just
/// the selector prefix.
pub fn decode_mint_call(input: &[u8]) -> Option<FoundationMintCall> {
    if INFTDropMarket::mintFromFixedPriceSaleCall::abi_decode(input).is_ok() {
        return Some(FoundationMintCall::FixedPriceSale);
    }
    if INFTDropMarket::mintFromFixedPriceSaleV2Call::abi_decode(input).is_ok() {
        return Some(FoundationMintCall::FixedPriceSaleV2);
    }
    if INFTDropMarket::mintFromFixedPriceSaleWithEarlyAccessAllowlistCall::abi_decode(input).is_ok()
    {
        return Some(FoundationMintCall::EarlyAccessAllowlist);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, address, bytes};
    use alloy::sol_types::SolCall;

    const COLLECTION: Address = address!("0x5959cD3a0B3f39e4177c3b4a88e90BcFEBBBE5f0");

    #[test]
    fn recognizes_v1_mint_calldata() {
        let call = INFTDropMarket::mintFromFixedPriceSaleCall {
            nftContract: COLLECTION,
            count: 2,
            buyReferrer: Address::ZERO,
        };
        assert_eq!(
            decode_mint_call(&call.abi_encode()),
            Some(FoundationMintCall::FixedPriceSale)
        );
    }

    #[test]
    fn recognizes_v2_mint_calldata() {
        let call = INFTDropMarket::mintFromFixedPriceSaleV2Call {
            nftContract: COLLECTION,
            count: 1,
            buyReferrer: Address::ZERO,
        };
        assert_eq!(
            decode_mint_call(&call.abi_encode()),
            Some(FoundationMintCall::FixedPriceSaleV2)
        );
    }

    #[test]
    fn recognizes_early_access_calldata() {
        let call = INFTDropMarket::mintFromFixedPriceSaleWithEarlyAccessAllowlistCall {
            nftContract: COLLECTION,
            count: U256::from(1),
            buyReferrer: Address::ZERO,
            proof: vec![B256::repeat_byte(0x11)],
        };
        assert_eq!(
            decode_mint_call(&call.abi_encode()),
            Some(FoundationMintCall::EarlyAccessAllowlist)
        );
    }

    #[test]
    fn rejects_unrelated_calldata() {
        assert_eq!(decode_mint_call(&bytes!("0xdeadbeef")), None);
        assert_eq!(decode_mint_call(&[]), None);
        // Selector prefix without a decodable body is not a mint
        let truncated = &INFTDropMarket::mintFromFixedPriceSaleCall::SELECTOR[..];
        assert_eq!(decode_mint_call(truncated), None);
    }

    #[test]
    fn v1_terms_carry_no_fee() {
        let terms = SaleTerms::from_v1(getFixedPriceSaleReturn {
            seller: Address::ZERO,
            price: U256::from(1_000_000u64),
            limitPerAccount: U256::from(3),
            numberOfTokensAvailableToMint: U256::from(10),
            marketCanMint: true,
            generalAvailabilityStartTime: U256::ZERO,
            earlyAccessStartTime: U256::ZERO,
        });
        assert_eq!(terms.version, SaleVersion::V1);
        assert_eq!(terms.effective_price(), U256::from(1_000_000u64));
    }

    #[test]
    fn v2_terms_fold_in_the_mint_fee() {
        let terms = SaleTerms::from_v2(getFixedPriceSaleV2Return {
            seller: Address::ZERO,
            price: U256::from(1_000_000u64),
            limitPerAccount: U256::ZERO,
            numberOfTokensAvailableToMint: U256::from(10),
            marketCanMint: true,
            generalAvailabilityStartTime: U256::ZERO,
            earlyAccessStartTime: U256::ZERO,
            mintFeePerNftInWei: U256::from(500u64),
        });
        assert_eq!(terms.version, SaleVersion::V2);
        assert_eq!(terms.effective_price(), U256::from(1_000_500u64));
    }
}
