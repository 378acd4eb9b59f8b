use alloy::{
    contract,
    primitives::{Address, B256},
    transports,
};
use std::fmt::Display;

/// Error raised by extraction, reconciliation and fill-time templating.
///
/// Absent protocol configuration is never an error: a sale type that is not
/// present on a contract yields an empty extraction result for that path.
/// Decode failures on untrusted historical calldata likewise yield empty
/// results rather than surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("allowlist fetch failed: {0}")]
    Fetch(String),

    #[error("allowlist root mismatch, on-chain: {expected}, recomputed: {computed}")]
    AllowlistMismatch { expected: B256, computed: B256 },

    #[error("allowlist not found: {0}")]
    AllowlistNotFound(B256),

    #[error("address {address} not on allowlist {root}")]
    NotOnAllowlist { root: B256, address: Address },

    #[error("descriptor requires an allowlist but carries no allowlist id")]
    MissingAllowlistId,

    #[error("malformed transaction template: {0}")]
    Template(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Error raised by the persistence collaborators.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<contract::Error> for MintError {
    fn from(value: contract::Error) -> Self {
        match value {
            contract::Error::TransportError(rpc_err) => Self::from(rpc_err),
            contract::Error::AbiError(_) | contract::Error::ZeroData(_, _) => {
                Self::Fatal(value.to_string())
            }
            _ => Self::Fatal(value.to_string()),
        }
    }
}

impl<E: Display> From<transports::RpcError<E>> for MintError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp)
                if resp.code == -32600 || resp.code == -32601 || resp.code == -32602 =>
            {
                Self::InvalidRequest(resp.message.to_string())
            }
            transports::RpcError::NullResp => {
                Self::Transport("unexpected empty RPC response".to_string())
            }
            _ => Self::Transport(value.to_string()),
        }
    }
}

impl From<reqwest::Error> for MintError {
    fn from(value: reqwest::Error) -> Self {
        Self::Fetch(value.to_string())
    }
}

impl From<alloy::sol_types::Error> for MintError {
    fn from(value: alloy::sol_types::Error) -> Self {
        Self::Fatal(value.to_string())
    }
}
