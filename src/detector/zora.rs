//! Zora creator-contract extractor (ERC1155).
//!
//! Sale terms live on permissioned minter strategy contracts, not the
//! collection: a collection can run a fixed-price sale, a merkle presale
//! and an ERC20-denominated sale concurrently, each through its own
//! strategy. Every discovered stage records which minter produced it, since
//! the collection alone cannot disambiguate.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
    providers::Provider,
    sol_types::SolCall,
};
use tracing::{trace, warn};

use super::{MintExtractor, head_instant, supply_cap, time_bound, wallet_cap};
use crate::{
    Chain,
    abi::zora::{IERC20Minter, IFixedPriceMinter, IMerkleMinter, IZoraCreator1155},
    allowlist::{AllowlistStore, merkle},
    error::MintError,
    fetch::{AllowlistFetcher, Premint, PremintSource, parse_u256},
    status::{self, SaleCounters},
    template::FillContext,
    types::{
        MintDescriptor, MintDetails, MintInfo, MintKind, MintStage, MintStandard, MintStatus,
        NATIVE_CURRENCY, TxParam, TxRequest, TxTemplate,
    },
};

/// Token id and (when the entrypoint names one) minter strategy recovered
/// from historical calldata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedMint {
    pub token_id: U256,
    pub minter: Option<Address>,
}

/// Live token counters shared by every stage of one token.
#[derive(Clone, Copy, Debug, Default)]
struct TokenSupply {
    max_supply: Option<U256>,
    minted: Option<U256>,
}

pub struct ZoraExtractor<P, F, A> {
    chain: Chain,
    provider: P,
    fetcher: F,
    allowlists: A,
}

impl<P, F, A> ZoraExtractor<P, F, A>
where
    P: Provider + Clone,
    F: AllowlistFetcher + PremintSource,
    A: AllowlistStore,
{
    pub fn new(chain: &Chain, provider: P, fetcher: F, allowlists: A) -> Self {
        Self {
            chain: chain.clone(),
            provider,
            fetcher,
            allowlists,
        }
    }

    /// Per-item protocol fee. The fee accessor moved across contract
    /// revisions, so probe each known signature instead of assuming one.
    async fn mint_fee(&self, collection: Address) -> U256 {
        let contract = IZoraCreator1155::new(collection, self.provider.clone());
        match contract.mintFee().call().await {
            Ok(fee) => return fee,
            Err(err) => trace!(%collection, %err, "no mintFee accessor"),
        }
        match contract.computeTotalReward_0(U256::ONE).call().await {
            Ok(fee) => return fee,
            Err(err) => trace!(%collection, %err, "no single-arg computeTotalReward"),
        }
        match contract
            .computeTotalReward_1(U256::ZERO, U256::ONE)
            .call()
            .await
        {
            Ok(fee) => return fee,
            Err(err) => {
                trace!(%collection, %err, "no two-arg computeTotalReward, assuming zero fee");
            }
        }
        U256::ZERO
    }

    async fn token_supply(&self, collection: Address, token_id: U256) -> TokenSupply {
        let contract = IZoraCreator1155::new(collection, self.provider.clone());
        match contract.getTokenInfo(token_id).call().await {
            Ok(info) => TokenSupply {
                max_supply: supply_cap(info.maxSupply),
                minted: Some(info.totalMinted),
            },
            Err(err) => {
                trace!(%collection, %token_id, %err, "token info unavailable");
                TokenSupply::default()
            }
        }
    }

    fn base_descriptor(
        &self,
        collection: Address,
        token_id: U256,
        minter: Address,
        fee: U256,
        supply: TokenSupply,
        tx: TxTemplate,
    ) -> MintDescriptor {
        MintDescriptor {
            collection,
            contract: collection,
            token_id: Some(token_id),
            stage: MintStage::PublicSale,
            kind: MintKind::Public,
            standard: MintStandard::Zora,
            status: MintStatus::Open,
            status_reason: None,
            currency: NATIVE_CURRENCY,
            price: U256::ZERO,
            max_mints_per_wallet: None,
            max_supply: supply.max_supply,
            start_time: None,
            end_time: None,
            allowlist_id: None,
            details: MintDetails {
                tx,
                info: Some(MintInfo {
                    minter: Some(minter),
                    fee: Some(fee),
                    ..Default::default()
                }),
            },
        }
    }

    /// `mintWithRewards(minter, tokenId, quantity, minterArguments,
    /// mintReferral)` template shared by the native-currency stages.
    fn rewards_template(&self, collection: Address, token_id: U256, minter: Address) -> TxTemplate {
        TxTemplate::new(
            collection,
            IZoraCreator1155::mintWithRewardsCall::SELECTOR.into(),
            vec![
                TxParam::contract("address", minter),
                TxParam::unknown_uint256(token_id),
                TxParam::quantity("uint256"),
                TxParam::custom("bytes"),
                TxParam::referrer("address"),
            ],
        )
    }

    async fn fixed_price_stage(
        &self,
        collection: Address,
        token_id: U256,
        minter: Address,
        fee: U256,
        supply: TokenSupply,
        now: u64,
    ) -> Option<MintDescriptor> {
        let strategy = IFixedPriceMinter::new(minter, self.provider.clone());
        let config = match strategy.sale(collection, token_id).call().await {
            Ok(config) => config,
            Err(err) => {
                trace!(%collection, %token_id, %minter, %err, "no fixed-price sale");
                return None;
            }
        };
        if config.saleStart == 0 && config.saleEnd == 0 && config.pricePerToken.is_zero() {
            return None;
        }

        let mut descriptor = self.base_descriptor(
            collection,
            token_id,
            minter,
            fee,
            supply,
            self.rewards_template(collection, token_id, minter),
        );
        descriptor.price = U256::from(config.pricePerToken.to::<u128>()).saturating_add(fee);
        descriptor.max_mints_per_wallet = wallet_cap(config.maxTokensPerAddress);
        descriptor.start_time = time_bound(config.saleStart);
        descriptor.end_time = time_bound(config.saleEnd);
        status::apply(
            &mut descriptor,
            &SaleCounters {
                minted: supply.minted,
                ..Default::default()
            },
            now,
        );
        Some(descriptor)
    }

    async fn merkle_stage(
        &self,
        collection: Address,
        token_id: U256,
        minter: Address,
        fee: U256,
        supply: TokenSupply,
        now: u64,
    ) -> Result<Option<MintDescriptor>, MintError> {
        let strategy = IMerkleMinter::new(minter, self.provider.clone());
        let config = match strategy.sale(collection, token_id).call().await {
            Ok(config) => config,
            Err(err) => {
                trace!(%collection, %token_id, %minter, %err, "no merkle sale");
                return Ok(None);
            }
        };
        if config.merkleRoot.is_zero() {
            return Ok(None);
        }

        if !self.allowlists.exists(config.merkleRoot).await? {
            let mut items = self.fetcher.fetch_by_root(config.merkleRoot).await?;
            let computed = merkle::root(&items);
            if computed != config.merkleRoot {
                warn!(
                    %collection, %token_id, expected = %config.merkleRoot, %computed,
                    "fetched allowlist does not match on-chain root, dropping presale stage"
                );
                return Ok(None);
            }
            for item in &mut items {
                item.actual_price = item.price.map(|p| p.saturating_add(fee));
            }
            self.allowlists.create(config.merkleRoot, items).await?;
        }

        let floor_price = self
            .allowlists
            .get(config.merkleRoot)
            .await?
            .unwrap_or_default()
            .iter()
            .filter_map(|item| item.price)
            .min()
            .unwrap_or_default();

        let mut descriptor = self.base_descriptor(
            collection,
            token_id,
            minter,
            fee,
            supply,
            self.rewards_template(collection, token_id, minter),
        );
        descriptor.stage = MintStage::Presale;
        descriptor.kind = MintKind::Allowlist;
        descriptor.allowlist_id = Some(config.merkleRoot);
        // Per-entry terms vary; the descriptor carries the floor
        descriptor.price = floor_price.saturating_add(fee);
        descriptor.start_time = time_bound(config.presaleStart);
        descriptor.end_time = time_bound(config.presaleEnd);
        status::apply(
            &mut descriptor,
            &SaleCounters {
                minted: supply.minted,
                ..Default::default()
            },
            now,
        );
        Ok(Some(descriptor))
    }

    async fn erc20_stage(
        &self,
        collection: Address,
        token_id: U256,
        minter: Address,
        supply: TokenSupply,
        now: u64,
    ) -> Option<MintDescriptor> {
        let strategy = IERC20Minter::new(minter, self.provider.clone());
        let config = match strategy.sale(collection, token_id).call().await {
            Ok(config) => config,
            Err(err) => {
                trace!(%collection, %token_id, %minter, %err, "no ERC20 sale");
                return None;
            }
        };
        if config.currency.is_zero() {
            return None;
        }

        // The ERC20 minter is called directly and takes no native fee;
        // rewards are carved out of the ERC20 amount.
        let tx = TxTemplate::new(
            minter,
            IERC20Minter::mintCall::SELECTOR.into(),
            vec![
                TxParam::recipient("address"),
                TxParam::quantity("uint256"),
                TxParam::contract("address", collection),
                TxParam::unknown_uint256(token_id),
                TxParam::price("uint256"),
                TxParam::unknown("address", config.currency.to_string()),
                TxParam::referrer("address"),
                TxParam::comment("string"),
            ],
        );
        let mut descriptor =
            self.base_descriptor(collection, token_id, minter, U256::ZERO, supply, tx);
        descriptor.currency = config.currency;
        descriptor.price = config.pricePerToken;
        descriptor.max_mints_per_wallet = wallet_cap(config.maxTokensPerAddress);
        descriptor.start_time = time_bound(config.saleStart);
        descriptor.end_time = time_bound(config.saleEnd);
        status::apply(
            &mut descriptor,
            &SaleCounters {
                minted: supply.minted,
                ..Default::default()
            },
            now,
        );
        Some(descriptor)
    }

    fn premint_descriptor(&self, collection: Address, premint: &Premint, now: u64) -> MintDescriptor {
        let config = &premint.token_config;
        let price = config
            .price_per_token
            .as_ref()
            .and_then(|v| parse_u256(v).ok())
            .unwrap_or_default();
        let minter = self
            .chain
            .zora_fixed_price_minters()
            .first()
            .copied()
            .unwrap_or_default();

        let start = config.mint_start.unwrap_or_default();
        let end = (start != 0)
            .then_some(config.mint_duration)
            .flatten()
            .filter(|d| *d != 0)
            .map(|d| start + d);

        // The premint's token id is assigned on first on-chain mint; until
        // then the stage is collection-scoped and routes through the
        // standard fixed-price minter once materialized.
        let mut descriptor = MintDescriptor {
            collection,
            contract: collection,
            token_id: None,
            stage: MintStage::PublicSale,
            kind: MintKind::Public,
            standard: MintStandard::Zora,
            status: MintStatus::Open,
            status_reason: None,
            currency: NATIVE_CURRENCY,
            price,
            max_mints_per_wallet: config.max_tokens_per_address.filter(|m| *m != 0),
            max_supply: config
                .max_supply
                .as_ref()
                .and_then(|v| parse_u256(v).ok())
                .and_then(supply_cap),
            start_time: time_bound(start),
            end_time: end,
            allowlist_id: None,
            details: MintDetails {
                tx: self.rewards_template(collection, U256::ZERO, minter),
                info: Some(MintInfo {
                    minter: Some(minter),
                    fee: None,
                    premint_uid: Some(premint.uid),
                }),
            },
        };
        status::apply(&mut descriptor, &SaleCounters::default(), now);
        descriptor
    }
}

impl<P, F, A> MintExtractor for ZoraExtractor<P, F, A>
where
    P: Provider + Clone,
    F: AllowlistFetcher + PremintSource,
    A: AllowlistStore,
{
    fn standard(&self) -> MintStandard {
        MintStandard::Zora
    }

    fn is_multi_token(&self) -> bool {
        true
    }

    async fn extract_by_collection(
        &self,
        collection: Address,
        token_id: Option<U256>,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        // Stages are token-scoped; without a token there is nothing to read
        let Some(token_id) = token_id else {
            return Ok(vec![]);
        };
        let (_, now) = head_instant(&self.provider).await?;
        let fee = self.mint_fee(collection).await;
        let supply = self.token_supply(collection, token_id).await;

        let mut descriptors = Vec::new();
        for minter in self.chain.zora_fixed_price_minters() {
            if let Some(d) = self
                .fixed_price_stage(collection, token_id, *minter, fee, supply, now)
                .await
            {
                descriptors.push(d);
            }
        }
        for minter in self.chain.zora_merkle_minters() {
            if let Some(d) = self
                .merkle_stage(collection, token_id, *minter, fee, supply, now)
                .await?
            {
                descriptors.push(d);
            }
        }
        for minter in self.chain.zora_erc20_minters() {
            if let Some(d) = self
                .erc20_stage(collection, token_id, *minter, supply, now)
                .await
            {
                descriptors.push(d);
            }
        }
        Ok(descriptors)
    }

    async fn extract_by_tx(
        &self,
        collection: Address,
        tx: &TxRequest,
    ) -> Result<Vec<MintDescriptor>, MintError> {
        let mut descriptors = Vec::new();
        let mut seen = Vec::new();
        for decoded in decode_mint_calls(&tx.input) {
            if seen.contains(&decoded.token_id) {
                continue;
            }
            seen.push(decoded.token_id);
            descriptors.extend(
                self.extract_by_collection(collection, Some(decoded.token_id))
                    .await?,
            );
        }
        Ok(descriptors)
    }

    async fn premints(&self, collection: Address) -> Result<Vec<MintDescriptor>, MintError> {
        let premints = self
            .fetcher
            .fetch_premints(self.chain.chain_id(), collection)
            .await?;
        if premints.is_empty() {
            return Ok(vec![]);
        }
        let (_, now) = head_instant(&self.provider).await?;
        Ok(premints
            .iter()
            .map(|premint| self.premint_descriptor(collection, premint, now))
            .collect())
    }
}

/// Recovers `(tokenId, minter)` pairs from mint calldata, unwrapping
/// batched `multicall` transactions. Unrecognized selectors and calldata
/// that fails to fully decode yield nothing; historical transactions are
/// untrusted input.
pub fn decode_mint_calls(input: &[u8]) -> Vec<DecodedMint> {
    if let Ok(call) = IZoraCreator1155::multicallCall::abi_decode(input) {
        return call
            .data
            .iter()
            .flat_map(|inner| decode_mint_calls(inner))
            .collect();
    }
    if let Ok(call) = IZoraCreator1155::mint_0Call::abi_decode(input) {
        return vec![DecodedMint {
            token_id: call.tokenId,
            minter: Some(call.minter),
        }];
    }
    if let Ok(call) = IZoraCreator1155::mint_1Call::abi_decode(input) {
        return vec![DecodedMint {
            token_id: call.tokenId,
            minter: Some(call.minter),
        }];
    }
    if let Ok(call) = IZoraCreator1155::mintWithRewardsCall::abi_decode(input) {
        return vec![DecodedMint {
            token_id: call.tokenId,
            minter: Some(call.minter),
        }];
    }
    if let Ok(call) = IERC20Minter::mintCall::abi_decode(input) {
        return vec![DecodedMint {
            token_id: call.tokenId,
            minter: None,
        }];
    }
    vec![]
}

/// Packs the strategy-specific `minterArguments` bytes at fill time.
///
/// Fixed-price strategies decode `(mintTo)` or `(mintTo, comment)`; the
/// merkle strategy decodes `(mintTo, maxQuantity, pricePerToken, proof)`
/// with the entry's own terms.
pub(crate) fn minter_arguments(ctx: &FillContext<'_>) -> Result<DynSolValue, MintError> {
    let encoded = match ctx.descriptor.kind {
        MintKind::Public => {
            if ctx.comment.is_empty() {
                DynSolValue::Tuple(vec![DynSolValue::Address(ctx.recipient)]).abi_encode_params()
            } else {
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(ctx.recipient),
                    DynSolValue::String(ctx.comment.clone()),
                ])
                .abi_encode_params()
            }
        }
        MintKind::Allowlist => {
            let proof = ctx.proof.as_ref().ok_or(MintError::MissingAllowlistId)?;
            DynSolValue::Tuple(vec![
                DynSolValue::Address(ctx.recipient),
                DynSolValue::Uint(proof.max_mints.map(U256::from).unwrap_or_default(), 256),
                DynSolValue::Uint(proof.price.unwrap_or_default(), 256),
                DynSolValue::Array(
                    proof
                        .proof
                        .iter()
                        .map(|node| DynSolValue::FixedBytes(*node, 32))
                        .collect(),
                ),
            ])
            .abi_encode_params()
        }
    };
    Ok(DynSolValue::Bytes(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, address, bytes};

    const COLLECTION: Address = address!("0x1111111111111111111111111111111111111111");
    const MINTER: Address = address!("0x04E2516A2c207E84a1839755675dfd8eF6302F0a");

    fn mint_with_rewards(token_id: u64) -> Vec<u8> {
        IZoraCreator1155::mintWithRewardsCall {
            minter: MINTER,
            tokenId: U256::from(token_id),
            quantity: U256::from(1),
            minterArguments: Bytes::new(),
            mintReferral: Address::ZERO,
        }
        .abi_encode()
    }

    #[test]
    fn decodes_mint_with_rewards() {
        let decoded = decode_mint_calls(&mint_with_rewards(7));
        assert_eq!(
            decoded,
            vec![DecodedMint {
                token_id: U256::from(7),
                minter: Some(MINTER),
            }]
        );
    }

    #[test]
    fn decodes_legacy_and_rewards_recipient_mints() {
        let legacy = IZoraCreator1155::mint_0Call {
            minter: MINTER,
            tokenId: U256::from(1),
            quantity: U256::from(2),
            minterArguments: Bytes::new(),
        }
        .abi_encode();
        assert_eq!(decode_mint_calls(&legacy)[0].token_id, U256::from(1));

        let with_recipients = IZoraCreator1155::mint_1Call {
            minter: MINTER,
            tokenId: U256::from(2),
            quantity: U256::from(1),
            rewardsRecipients: vec![Address::ZERO],
            minterArguments: Bytes::new(),
        }
        .abi_encode();
        assert_eq!(decode_mint_calls(&with_recipients)[0].token_id, U256::from(2));
    }

    #[test]
    fn decodes_erc20_minter_call() {
        let call = IERC20Minter::mintCall {
            mintTo: Address::ZERO,
            quantity: U256::from(1),
            tokenAddress: COLLECTION,
            tokenId: U256::from(3),
            totalValue: U256::from(100),
            currency: address!("0x2222222222222222222222222222222222222222"),
            mintReferral: Address::ZERO,
            comment: String::new(),
        }
        .abi_encode();
        assert_eq!(
            decode_mint_calls(&call),
            vec![DecodedMint {
                token_id: U256::from(3),
                minter: None,
            }]
        );
    }

    #[test]
    fn unwraps_multicall_batches() {
        let batch = IZoraCreator1155::multicallCall {
            data: vec![
                mint_with_rewards(1).into(),
                // Unrelated inner calls contribute nothing
                bytes!("0xdeadbeef"),
                mint_with_rewards(2).into(),
            ],
        }
        .abi_encode();
        let decoded = decode_mint_calls(&batch);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].token_id, U256::from(1));
        assert_eq!(decoded[1].token_id, U256::from(2));
    }

    #[test]
    fn rejects_malformed_calldata() {
        assert!(decode_mint_calls(&[]).is_empty());
        assert!(decode_mint_calls(&bytes!("0xdeadbeef")).is_empty());
        let truncated = &IZoraCreator1155::mintWithRewardsCall::SELECTOR[..];
        assert!(decode_mint_calls(truncated).is_empty());
    }

    #[test]
    fn public_minter_arguments_pack_the_recipient() {
        let descriptor = crate::testing::descriptor_fixture()
            .standard(MintStandard::Zora)
            .build();
        let recipient = address!("0x3333333333333333333333333333333333333333");
        let ctx = FillContext {
            descriptor: &descriptor,
            recipient,
            quantity: 1,
            referrer: Address::ZERO,
            comment: String::new(),
            proof: None,
        };
        let DynSolValue::Bytes(encoded) = minter_arguments(&ctx).unwrap() else {
            panic!("minter arguments must be bytes");
        };
        // abi.encode(address): one 32-byte word with the address right-aligned
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[12..], recipient.as_slice());
    }

    #[test]
    fn allowlist_minter_arguments_require_a_proof() {
        let descriptor = crate::testing::descriptor_fixture()
            .standard(MintStandard::Zora)
            .kind(MintKind::Allowlist)
            .build();
        let ctx = FillContext {
            descriptor: &descriptor,
            recipient: Address::ZERO,
            quantity: 1,
            referrer: Address::ZERO,
            comment: String::new(),
            proof: None,
        };
        assert!(minter_arguments(&ctx).is_err());
    }
}
