//! Off-chain allowlist and premint payload fetching.
//!
//! Allowlist documents live either behind a protocol-hosted service
//! (queried by merkle root) or behind a content-addressed URI recorded in
//! an on-chain event. Both payloads are untrusted input: extractors must
//! rebuild the merkle tree locally and check the recomputed root against
//! the on-chain one before persisting anything fetched here.

use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};
use serde::Deserialize;
use url::Url;

use crate::{error::MintError, types::AllowlistItem};

// Trailing slashes matter: Url::join replaces the last path segment
// otherwise
const DEFAULT_ZORA_ALLOWLIST_BASE: &str = "https://allowlist.zora.co/";
const DEFAULT_ZORA_PREMINT_BASE: &str = "https://api.zora.co/premint/";

/// Fetches allowlist payloads from protocol services or content URIs.
pub trait AllowlistFetcher: Send + Sync {
    /// Resolves a content-addressed tree URI (ipfs/ar tolerated) into its
    /// leaf set.
    fn fetch_tree_uri(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<Vec<AllowlistItem>, MintError>> + Send;

    /// Queries the protocol's hosted allowlist service by merkle root.
    fn fetch_by_root(
        &self,
        root: B256,
    ) -> impl Future<Output = Result<Vec<AllowlistItem>, MintError>> + Send;
}

/// Fetches offline-signed mint configurations not yet materialized
/// on-chain.
pub trait PremintSource: Send + Sync {
    fn fetch_premints(
        &self,
        chain_id: u64,
        collection: Address,
    ) -> impl Future<Output = Result<Vec<Premint>, MintError>> + Send;
}

/// Content-addressed tree payload: a flat list of unhashed leaf addresses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreePayload {
    unhashed_leaves: Vec<Address>,
}

#[derive(Debug, Deserialize)]
struct RootPayload {
    entries: Vec<RootEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootEntry {
    user: Address,
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    max_can_mint: Option<u64>,
}

/// Offline-signed mint config as served by the premint API.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Premint {
    pub uid: u64,
    #[serde(default)]
    pub token_config: PremintTokenConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremintTokenConfig {
    #[serde(default)]
    pub price_per_token: Option<serde_json::Value>,
    #[serde(default)]
    pub max_supply: Option<serde_json::Value>,
    #[serde(default)]
    pub max_tokens_per_address: Option<u64>,
    #[serde(default)]
    pub mint_start: Option<u64>,
    #[serde(default)]
    pub mint_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PremintDocument {
    #[serde(default)]
    premints: Vec<Premint>,
}

/// Reqwest-backed fetcher against the live protocol services.
#[derive(Clone, Debug)]
pub struct HttpAllowlistFetcher {
    client: reqwest::Client,
    allowlist_base: Url,
    premint_base: Url,
}

impl Default for HttpAllowlistFetcher {
    fn default() -> Self {
        Self::new(
            DEFAULT_ZORA_ALLOWLIST_BASE.parse().expect("static url"),
            DEFAULT_ZORA_PREMINT_BASE.parse().expect("static url"),
        )
    }
}

impl HttpAllowlistFetcher {
    pub fn new(allowlist_base: Url, premint_base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            allowlist_base,
            premint_base,
        }
    }
}

impl AllowlistFetcher for HttpAllowlistFetcher {
    async fn fetch_tree_uri(&self, uri: &str) -> Result<Vec<AllowlistItem>, MintError> {
        let url = to_gateway_url(uri)?;
        let payload: TreePayload = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(payload
            .unhashed_leaves
            .into_iter()
            .map(AllowlistItem::address_only)
            .collect())
    }

    async fn fetch_by_root(&self, root: B256) -> Result<Vec<AllowlistItem>, MintError> {
        let url = self
            .allowlist_base
            .join(&format!("allowlist/{root}"))
            .map_err(|e| MintError::Fetch(e.to_string()))?;
        let payload: RootPayload = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        payload
            .entries
            .into_iter()
            .map(|entry| {
                Ok(AllowlistItem {
                    address: entry.user,
                    price: entry.price.as_ref().map(parse_u256).transpose()?,
                    actual_price: None,
                    max_mints: entry.max_can_mint,
                })
            })
            .collect()
    }
}

impl PremintSource for HttpAllowlistFetcher {
    async fn fetch_premints(
        &self,
        chain_id: u64,
        collection: Address,
    ) -> Result<Vec<Premint>, MintError> {
        let Some(chain_name) = zora_chain_name(chain_id) else {
            return Ok(vec![]);
        };
        let url = self
            .premint_base
            .join(&format!("signature/{chain_name}/{collection}"))
            .map_err(|e| MintError::Fetch(e.to_string()))?;
        let resp = self.client.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        let payload: PremintDocument = resp.error_for_status()?.json().await?;
        Ok(payload.premints)
    }
}

/// Rewrites content-addressed URI schemes to public gateways.
pub fn to_gateway_url(uri: &str) -> Result<Url, MintError> {
    let rewritten = if let Some(hash) = uri.strip_prefix("ipfs://") {
        format!("https://ipfs.io/ipfs/{}", hash.trim_start_matches("ipfs/"))
    } else if let Some(id) = uri.strip_prefix("ar://") {
        format!("https://arweave.net/{id}")
    } else {
        uri.to_string()
    };
    rewritten
        .parse()
        .map_err(|_| MintError::Fetch(format!("invalid allowlist uri: {uri}")))
}

/// Prices arrive as JSON numbers or decimal/hex strings depending on the
/// service version.
pub(crate) fn parse_u256(value: &serde_json::Value) -> Result<U256, MintError> {
    match value {
        serde_json::Value::Number(n) => U256::from_str(&n.to_string()),
        serde_json::Value::String(s) => U256::from_str(s),
        _ => return Err(MintError::Fetch(format!("unexpected price value: {value}"))),
    }
    .map_err(|e| MintError::Fetch(format!("unparseable price: {e}")))
}

fn zora_chain_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("ethereum"),
        10 => Some("optimism"),
        8453 => Some("base"),
        42161 => Some("arbitrum"),
        7777777 => Some("zora"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_rewrites() {
        assert_eq!(
            to_gateway_url("ipfs://QmFoo").unwrap().as_str(),
            "https://ipfs.io/ipfs/QmFoo"
        );
        assert_eq!(
            to_gateway_url("ar://tx123").unwrap().as_str(),
            "https://arweave.net/tx123"
        );
        assert_eq!(
            to_gateway_url("https://example.com/tree.json").unwrap().as_str(),
            "https://example.com/tree.json"
        );
        assert!(to_gateway_url("not a uri").is_err());
    }

    #[test]
    fn price_value_coercion() {
        assert_eq!(
            parse_u256(&serde_json::json!("1000000")).unwrap(),
            U256::from(1_000_000u64)
        );
        assert_eq!(
            parse_u256(&serde_json::json!(42)).unwrap(),
            U256::from(42u64)
        );
        assert_eq!(
            parse_u256(&serde_json::json!("0x10")).unwrap(),
            U256::from(16u64)
        );
        assert!(parse_u256(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn tree_payload_shape() {
        let payload: TreePayload = serde_json::from_str(
            r#"{"unhashedLeaves": ["0x0000000000000000000000000000000000000001"]}"#,
        )
        .unwrap();
        assert_eq!(payload.unhashed_leaves.len(), 1);
    }

    #[test]
    fn root_payload_shape() {
        let payload: RootPayload = serde_json::from_str(
            r#"{"entries": [{"user": "0x0000000000000000000000000000000000000001", "price": "777000000000000", "maxCanMint": 3}]}"#,
        )
        .unwrap();
        assert_eq!(payload.entries[0].max_can_mint, Some(3));
    }
}
