//! Fill-time transaction data generation.
//!
//! Resolves a descriptor's typed parameter slots against the caller's
//! context (recipient, quantity, optional referrer/comment) and ABI-encodes
//! the call. Resolution is a pure function of `(descriptor, recipient,
//! quantity)` except for the allowlist proof lookup, which goes through the
//! allowlist store.
//!
//! Fill-time is a user-initiated, irreversible action: any inconsistency
//! (missing allowlist id, address without an entry, malformed slot) is a
//! hard error rather than a silently unusable transaction.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{Address, U256},
};

use crate::{
    allowlist::{AllowlistStore, proof_for_address},
    detector,
    error::MintError,
    types::{
        MintDescriptor, MintKind, NATIVE_CURRENCY, ParamKind, ProofValue, Quantity, TxFill,
        TxParam,
    },
};

/// Caller-supplied fill context beyond recipient and quantity.
#[derive(Clone, Debug, Default)]
pub struct FillOptions {
    pub referrer: Option<Address>,
    pub comment: Option<String>,
}

/// Resolved inputs a slot can draw from.
pub(crate) struct FillContext<'d> {
    pub descriptor: &'d MintDescriptor,
    pub recipient: Address,
    pub quantity: Quantity,
    pub referrer: Address,
    pub comment: String,
    pub proof: Option<ProofValue>,
}

/// Builds ready-to-send transaction data from descriptors.
pub struct TxDataBuilder<'a, S> {
    allowlists: &'a S,
    default_referrer: Option<Address>,
}

impl<'a, S: AllowlistStore> TxDataBuilder<'a, S> {
    pub fn new(allowlists: &'a S) -> Self {
        Self {
            allowlists,
            default_referrer: None,
        }
    }

    /// Referrer used when the caller does not supply one; zero address
    /// otherwise.
    pub fn with_default_referrer(mut self, referrer: Address) -> Self {
        self.default_referrer = Some(referrer);
        self
    }

    pub async fn generate_tx_data(
        &self,
        descriptor: &MintDescriptor,
        recipient: Address,
        quantity: Quantity,
    ) -> Result<TxFill, MintError> {
        self.generate_tx_data_with(descriptor, recipient, quantity, &FillOptions::default())
            .await
    }

    pub async fn generate_tx_data_with(
        &self,
        descriptor: &MintDescriptor,
        recipient: Address,
        quantity: Quantity,
        options: &FillOptions,
    ) -> Result<TxFill, MintError> {
        let template = &descriptor.details.tx;
        let selector = template
            .selector()
            .map_err(|e| MintError::Template(format!("bad signature: {e}")))?;

        // Allowlist stages need the proof resolved up front; both explicit
        // allowlist slots and protocol-specific custom slots consume it.
        let proof = if descriptor.kind == MintKind::Allowlist {
            Some(self.generate_proof_value(descriptor, recipient).await?)
        } else {
            None
        };

        let ctx = FillContext {
            descriptor,
            recipient,
            quantity,
            referrer: options
                .referrer
                .or(self.default_referrer)
                .unwrap_or(Address::ZERO),
            comment: options.comment.clone().unwrap_or_default(),
            proof,
        };

        let values = template
            .data
            .params
            .iter()
            .map(|param| resolve_param(param, &ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = selector.as_slice().to_vec();
        data.extend(DynSolValue::Tuple(values).abi_encode_params());

        Ok(TxFill {
            to: template.to,
            data: data.into(),
            value: native_value(descriptor, quantity)?,
        })
    }

    /// Merkle proof (plus entry terms) for `address` on the descriptor's
    /// allowlist.
    pub async fn generate_proof_value(
        &self,
        descriptor: &MintDescriptor,
        address: Address,
    ) -> Result<ProofValue, MintError> {
        let root = descriptor.allowlist_id.ok_or(MintError::MissingAllowlistId)?;
        proof_for_address(self.allowlists, root, address).await
    }
}

fn native_value(
    descriptor: &MintDescriptor,
    quantity: Quantity,
) -> Result<Option<U256>, MintError> {
    if descriptor.currency != NATIVE_CURRENCY {
        return Ok(None);
    }
    descriptor
        .price
        .checked_mul(U256::from(quantity))
        .map(Some)
        .ok_or_else(|| MintError::Template("native value overflow".to_string()))
}

fn parse_type(param: &TxParam) -> Result<DynSolType, MintError> {
    DynSolType::parse(&param.abi_type)
        .map_err(|e| MintError::Template(format!("bad abi type {}: {e}", param.abi_type)))
}

fn uint_value(param: &TxParam, value: U256) -> Result<DynSolValue, MintError> {
    match parse_type(param)? {
        DynSolType::Uint(bits) => Ok(DynSolValue::Uint(value, bits)),
        other => Err(MintError::Template(format!(
            "{:?} slot must be uint, got {other}",
            param.kind
        ))),
    }
}

fn baked_value(param: &TxParam) -> Result<DynSolValue, MintError> {
    let raw = param.abi_value.as_ref().ok_or_else(|| {
        MintError::Template(format!("{:?} slot carries no baked value", param.kind))
    })?;
    parse_type(param)?
        .coerce_str(raw)
        .map_err(|e| MintError::Template(format!("unparseable baked value {raw}: {e}")))
}

pub(crate) fn resolve_param(
    param: &TxParam,
    ctx: &FillContext<'_>,
) -> Result<DynSolValue, MintError> {
    match param.kind {
        ParamKind::Contract => match &param.abi_value {
            Some(_) => baked_value(param),
            None => Ok(DynSolValue::Address(ctx.descriptor.contract)),
        },
        ParamKind::Quantity => uint_value(param, U256::from(ctx.quantity)),
        ParamKind::Recipient => Ok(DynSolValue::Address(ctx.recipient)),
        ParamKind::Referrer => Ok(DynSolValue::Address(ctx.referrer)),
        // Entrypoints that take the price explicitly take the total for
        // the requested quantity (e.g. the ERC20 minter's `totalValue`)
        ParamKind::Price => {
            let total = ctx
                .descriptor
                .price
                .checked_mul(U256::from(ctx.quantity))
                .ok_or_else(|| MintError::Template("price overflow".to_string()))?;
            uint_value(param, total)
        }
        ParamKind::Comment => Ok(DynSolValue::String(ctx.comment.clone())),
        ParamKind::Allowlist => {
            let proof = ctx.proof.as_ref().ok_or(MintError::MissingAllowlistId)?;
            Ok(DynSolValue::Array(
                proof
                    .proof
                    .iter()
                    .map(|node| DynSolValue::FixedBytes(*node, 32))
                    .collect(),
            ))
        }
        ParamKind::Unknown => baked_value(param),
        ParamKind::Tuple => Ok(DynSolValue::Tuple(
            param
                .params
                .iter()
                .map(|nested| resolve_param(nested, ctx))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        ParamKind::Custom => detector::custom_value(param, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn native_value_is_price_times_quantity() {
        let descriptor = testing::descriptor_fixture().price(U256::from(1000)).build();
        assert_eq!(native_value(&descriptor, 3).unwrap(), Some(U256::from(3000)));
    }

    #[test]
    fn erc20_stage_attaches_no_native_value() {
        let erc20 = Address::repeat_byte(0xEE);
        let descriptor = testing::descriptor_fixture()
            .currency(erc20)
            .price(U256::from(1000))
            .build();
        assert_eq!(native_value(&descriptor, 3).unwrap(), None);
    }

    #[test]
    fn quantity_slot_rejects_non_uint_type() {
        let descriptor = testing::descriptor_fixture().build();
        let ctx = FillContext {
            descriptor: &descriptor,
            recipient: Address::ZERO,
            quantity: 1,
            referrer: Address::ZERO,
            comment: String::new(),
            proof: None,
        };
        let err = resolve_param(&TxParam::quantity("address"), &ctx).unwrap_err();
        assert!(matches!(err, MintError::Template(_)));
    }
}
