//! Wire types for the distribution API.
//!
//! The API speaks camelCase JSON and encodes u64 token amounts as decimal
//! strings so they survive JSON number precision; the `string_amount`
//! adapter converts them at the boundary.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{config::Cluster, math, recipients::Recipient};

/// Instant airdrops unlock the full allocation at claim time; vested ones
/// release the locked portion linearly over the unlock window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirdropKind {
    Instant,
    Vested,
}

impl fmt::Display for AirdropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirdropKind::Instant => f.write_str("instant"),
            AirdropKind::Vested => f.write_str("vested"),
        }
    }
}

/// Airdrop record as returned by the search and by-id endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airdrop {
    pub chain: String,
    pub mint: String,
    pub version: u64,
    /// Distributor address, doubling as the airdrop id.
    pub address: String,
    pub sender: String,
    pub name: String,
    #[serde(with = "string_amount")]
    pub max_num_nodes: u64,
    #[serde(with = "string_amount")]
    pub max_total_claim: u64,
    /// Unlocked tokens still sitting in the vault.
    #[serde(with = "string_amount")]
    pub total_amount_unlocked: u64,
    /// Locked tokens still sitting in the vault.
    #[serde(with = "string_amount")]
    pub total_amount_locked: u64,
    pub is_active: bool,
    pub is_on_chain: bool,
    pub is_verified: bool,
    #[serde(default)]
    pub is_aligned: bool,
    /// Only the by-id endpoint includes the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<[u8; 32]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clawback_dt: Option<String>,
}

impl Airdrop {
    /// Airdrops with any locked allocation vest over time.
    pub fn kind(&self) -> AirdropKind {
        if self.total_amount_locked > 0 {
            AirdropKind::Vested
        } else {
            AirdropKind::Instant
        }
    }

    /// Claimed so far: the pool minus what is still in the vault.
    pub fn amount_claimed(&self) -> u64 {
        self.max_total_claim
            .saturating_sub(self.total_amount_locked)
            .saturating_sub(self.total_amount_unlocked)
    }

    pub fn claim_progress(&self) -> f64 {
        math::claim_progress(self.amount_claimed(), self.max_total_claim)
    }
}

/// Page of airdrop records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropPage {
    pub items: Vec<Airdrop>,
    pub limit: u64,
    pub offset: u64,
    #[serde(default)]
    pub total: u64,
}

/// One wallet's allocation within one airdrop, with its merkle proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claimant {
    pub chain: String,
    pub distributor_address: String,
    /// Claimant wallet address.
    pub address: String,
    #[serde(with = "string_amount")]
    pub amount_unlocked: u64,
    #[serde(with = "string_amount")]
    pub amount_locked: u64,
    #[serde(with = "string_amount")]
    pub amount_claimed: u64,
    pub proof: Vec<[u8; 32]>,
}

/// Page of claimant allocations, as returned by the claimable endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimantPage {
    pub items: Vec<Claimant>,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub actor: String,
    pub limit: u64,
    pub offset: u64,
    pub filters: SearchFilters,
    pub sorters: Vec<SearchSorter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub include: SearchInclude,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInclude {
    pub is_on_chain: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSorter {
    pub by: String,
    pub order: String,
}

/// Body of the merkle root registration call. The wire name of the
/// recipient list is `recepients`; that is what the endpoint expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleRootRequest {
    #[serde(rename = "recepients")]
    pub recipients: Vec<Recipient>,
    pub name: String,
    pub mint: String,
}

/// Airdrop record created by the merkle root call, root included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleRootResponse {
    pub merkle_root: [u8; 32],
    pub chain: String,
    pub mint: String,
    pub version: u64,
    pub address: String,
    pub sender: String,
    pub name: String,
    #[serde(with = "string_amount")]
    pub max_num_nodes: u64,
    #[serde(with = "string_amount")]
    pub max_total_claim: u64,
    #[serde(with = "string_amount")]
    pub total_amount_unlocked: u64,
    #[serde(with = "string_amount")]
    pub total_amount_locked: u64,
    pub is_active: bool,
    pub is_on_chain: bool,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadataRequest {
    pub addresses: Vec<String>,
    pub cluster: Cluster,
}

/// Display metadata for a mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub supply: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl TokenMetadata {
    /// Stand-in used when the metadata service has no entry for a mint.
    pub fn placeholder(mint: &str) -> Self {
        let prefix: String = mint.chars().take(4).collect();
        TokenMetadata {
            address: mint.to_string(),
            name: "Unknown Token".to_string(),
            symbol: prefix.to_ascii_uppercase(),
            decimals: 9,
            supply: None,
            uri: None,
            image: None,
        }
    }
}

/// Per-mint price entry from the price endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub value: f64,
    #[serde(default)]
    pub update_unix_time: i64,
    #[serde(default, rename = "volumeUSD")]
    pub volume_usd: f64,
    #[serde(default)]
    pub price_change_percent: f64,
    #[serde(default)]
    pub volume_change_percent: f64,
    #[serde(default)]
    pub source: String,
}

/// Price endpoint response, keyed by mint address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    pub data: HashMap<String, TokenPrice>,
}

mod string_amount {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
