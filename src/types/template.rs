use alloy::primitives::{Address, Bytes, Selector, U256, hex};
use serde::{Deserialize, Serialize};

/// Role of a parameter slot inside a transaction template.
///
/// `Unknown` slots carry a literal value baked in at descriptor-creation
/// time; every other kind is filled at fill time from the caller's context.
/// `Custom` slots are resolved by protocol-specific code (e.g. Zora's
/// packed minter arguments).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamKind {
    Contract,
    Quantity,
    Recipient,
    Referrer,
    Price,
    Comment,
    Allowlist,
    Unknown,
    Tuple,
    Custom,
}

/// One typed parameter slot of a transaction template.
///
/// The ordered slot list must exactly match the target function's real ABI
/// ordering; that is the contract between extractor and template builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParam {
    pub kind: ParamKind,
    /// ABI type string the slot encodes as, e.g. `uint16` or `bytes32[]`.
    pub abi_type: String,
    /// Literal value for `Unknown`/`Contract` slots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi_value: Option<String>,
    /// Nested slots for `Tuple`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<TxParam>,
}

impl TxParam {
    fn slot(kind: ParamKind, abi_type: &str) -> Self {
        Self {
            kind,
            abi_type: abi_type.to_string(),
            abi_value: None,
            params: vec![],
        }
    }

    /// Target contract/minter address as baked by the extractor.
    pub fn contract(abi_type: &str, address: Address) -> Self {
        Self {
            abi_value: Some(address.to_string()),
            ..Self::slot(ParamKind::Contract, abi_type)
        }
    }

    pub fn quantity(abi_type: &str) -> Self {
        Self::slot(ParamKind::Quantity, abi_type)
    }

    pub fn recipient(abi_type: &str) -> Self {
        Self::slot(ParamKind::Recipient, abi_type)
    }

    pub fn referrer(abi_type: &str) -> Self {
        Self::slot(ParamKind::Referrer, abi_type)
    }

    pub fn price(abi_type: &str) -> Self {
        Self::slot(ParamKind::Price, abi_type)
    }

    pub fn comment(abi_type: &str) -> Self {
        Self::slot(ParamKind::Comment, abi_type)
    }

    pub fn allowlist(abi_type: &str) -> Self {
        Self::slot(ParamKind::Allowlist, abi_type)
    }

    pub fn unknown(abi_type: &str, abi_value: impl Into<String>) -> Self {
        Self {
            abi_value: Some(abi_value.into()),
            ..Self::slot(ParamKind::Unknown, abi_type)
        }
    }

    pub fn unknown_address(address: Address) -> Self {
        Self::unknown("address", address.to_string())
    }

    pub fn unknown_uint256(value: U256) -> Self {
        Self::unknown("uint256", value.to_string())
    }

    pub fn tuple(abi_type: &str, params: Vec<TxParam>) -> Self {
        Self {
            params,
            ..Self::slot(ParamKind::Tuple, abi_type)
        }
    }

    pub fn custom(abi_type: &str) -> Self {
        Self::slot(ParamKind::Custom, abi_type)
    }
}

/// Replayable transaction shape for filling a mint stage. Immutable once
/// created; reconciliation regenerates rather than mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTemplate {
    pub to: Address,
    pub data: TxData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxData {
    /// 4-byte function selector, hex-encoded.
    pub signature: String,
    pub params: Vec<TxParam>,
}

impl TxTemplate {
    pub fn new(to: Address, selector: Selector, params: Vec<TxParam>) -> Self {
        Self {
            to,
            data: TxData {
                signature: selector.to_string(),
                params,
            },
        }
    }

    /// Parses the stored hex signature back into selector bytes.
    pub fn selector(&self) -> Result<Selector, hex::FromHexError> {
        let raw: [u8; 4] = hex::decode_to_array(&self.data.signature)?;
        Ok(Selector::from(raw))
    }
}

/// Ready-to-send fill produced by the template builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxFill {
    pub to: Address,
    pub data: Bytes,
    /// Native value to attach; `None` for ERC20-denominated stages.
    pub value: Option<U256>,
}
