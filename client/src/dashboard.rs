//! High level dashboard operations: listing airdrops, resolving wallet
//! eligibility, creating distributors from recipient lists, and claiming.
//!
//! Wraps the API and RPC clients and caches API responses per request kind.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use solana_program::pubkey::Pubkey;
use solana_sdk::{
    signature::Signature,
    signer::{keypair::Keypair, Signer},
};
use tracing::{info, instrument, warn};

use crate::{
    api::ApiClient,
    balances::{self, TokenBalance, WalletBalances},
    cache::Cache,
    config::ClientConfig,
    distributor::{ClaimParams, CreateDistributorParams, DistributorClient},
    eligibility::{resolve_eligibility, Eligibility},
    error::{Error, Result},
    math,
    recipients::Recipient,
    state::MerkleDistributor,
    types::{Airdrop, AirdropKind, AirdropPage, Claimant, TokenMetadata},
};

/// Vesting granularity choices offered by the create form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockInterval {
    Daily,
    Weekly,
    Monthly,
}

impl UnlockInterval {
    pub fn seconds(&self) -> i64 {
        match self {
            UnlockInterval::Daily => 86_400,
            UnlockInterval::Weekly => 604_800,
            UnlockInterval::Monthly => 2_592_000,
        }
    }
}

impl FromStr for UnlockInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(UnlockInterval::Daily),
            "weekly" => Ok(UnlockInterval::Weekly),
            "monthly" => Ok(UnlockInterval::Monthly),
            _ => Err(Error::Validation(format!("invalid unlock interval: {s}"))),
        }
    }
}

impl std::fmt::Display for UnlockInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnlockInterval::Daily => f.write_str("daily"),
            UnlockInterval::Weekly => f.write_str("weekly"),
            UnlockInterval::Monthly => f.write_str("monthly"),
        }
    }
}

/// Clawback becomes available this long after vesting completes.
const CLAWBACK_DELAY: i64 = 30 * 86_400;

/// User input for creating an airdrop.
#[derive(Debug, Clone)]
pub struct CreateAirdropForm {
    pub name: String,
    /// Mint address, or "native" for wrapped SOL.
    pub mint: String,
    pub kind: AirdropKind,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub unlock_interval: UnlockInterval,
    /// Lets the admin close claim accounts later.
    pub cancellable: bool,
    /// Limits each wallet to one claim.
    pub single_claim: bool,
}

impl CreateAirdropForm {
    pub fn validate(&self, recipients: &[Recipient], curr_ts: i64) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Missing airdrop name".to_string()));
        }
        if self.mint.trim().is_empty() {
            return Err(Error::Validation("Missing token selection".to_string()));
        }
        if recipients.is_empty() {
            return Err(Error::Validation("No recipients uploaded".to_string()));
        }
        if self.kind == AirdropKind::Vested {
            let end_ts = self.end_ts.ok_or_else(|| {
                Error::Validation("Missing end date for vested airdrop".to_string())
            })?;
            if let Some(start_ts) = self.start_ts {
                if end_ts <= start_ts {
                    return Err(Error::Validation(
                        "End date must be after start date".to_string(),
                    ));
                }
            }
            if end_ts <= curr_ts {
                return Err(Error::Validation(
                    "End date must be in the future".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn resolved_mint(&self) -> String {
        if self.mint == "native" {
            spl_token::native_mint::ID.to_string()
        } else {
            self.mint.clone()
        }
    }

    /// Vesting timestamps as the program expects them. Instant airdrops get
    /// a zero window; a start already in the past collapses to zero so
    /// vesting runs from creation.
    pub fn vesting_window(&self, curr_ts: i64) -> (i64, i64) {
        if self.kind == AirdropKind::Instant {
            return (0, 0);
        }
        let start_ts = self.start_ts.filter(|s| *s >= curr_ts).unwrap_or(0);
        (start_ts, self.end_ts.unwrap_or(0))
    }
}

/// Airdrop record joined with token metadata, price, and chain state.
#[derive(Debug, Clone)]
pub struct AirdropDetail {
    pub airdrop: Airdrop,
    pub kind: AirdropKind,
    pub amount_claimed: u64,
    /// Claim progress in percent.
    pub progress: f64,
    pub token: TokenMetadata,
    /// 0.0 when no price is known.
    pub price_usd: f64,
    pub onchain: Option<MerkleDistributor>,
}

impl AirdropDetail {
    /// Percent of the vesting window elapsed, for vested on-chain airdrops.
    pub fn vesting_progress(&self, curr_ts: i64) -> Option<f64> {
        let distributor = self.onchain.as_ref()?;
        if self.kind != AirdropKind::Vested || distributor.end_ts <= distributor.start_ts {
            return None;
        }
        Some(math::vesting_progress(
            curr_ts,
            distributor.start_ts,
            distributor.end_ts,
        ))
    }

    /// USD value of the whole pool, when a price is known.
    pub fn total_value_usd(&self) -> Option<f64> {
        if self.price_usd <= 0.0 {
            return None;
        }
        Some(math::token_usd_value(
            self.airdrop.max_total_claim,
            self.token.decimals,
            self.price_usd,
        ))
    }
}

/// One entry of the claimable view: the wallet's allocation and, when the
/// API still knows it, the airdrop record behind it.
#[derive(Debug, Clone)]
pub struct ClaimableAirdrop {
    pub claimant: Claimant,
    pub airdrop: Option<Airdrop>,
}

#[derive(Debug)]
pub struct CreatedAirdrop {
    pub address: String,
    pub distributor: Pubkey,
    pub signature: Option<Signature>,
}

pub struct Dashboard {
    api: ApiClient,
    distributor: DistributorClient,
    airdrops: Cache<String, Airdrop>,
    claimables: Cache<String, Vec<Claimant>>,
    claimants: Cache<(String, String), Option<Claimant>>,
    metadata: Cache<String, TokenMetadata>,
    prices: Cache<String, f64>,
}

impl Dashboard {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api: ApiClient::new(config.api_url.as_str(), config.cluster),
            distributor: DistributorClient::new(&config.rpc_url, config.program_id),
            airdrops: Cache::new(),
            claimables: Cache::new(),
            claimants: Cache::new(),
            metadata: Cache::new(),
            prices: Cache::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn distributor_client(&self) -> &DistributorClient {
        &self.distributor
    }

    fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    /// Pages through active on-chain airdrops.
    #[instrument(skip(self))]
    pub async fn airdrops(&self, limit: u64, offset: u64) -> Result<AirdropPage> {
        self.api.search_airdrops("", limit, offset).await
    }

    async fn airdrop(&self, id: &str) -> Result<Airdrop> {
        self.airdrops
            .get_or_fetch(&id.to_string(), || self.api.airdrop(id))
            .await
    }

    /// Full detail for one airdrop. Metadata, price, and chain state are
    /// fetched concurrently; the latter two degrade rather than fail.
    #[instrument(skip(self))]
    pub async fn airdrop_detail(&self, id: &str) -> Result<AirdropDetail> {
        let airdrop = self.airdrop(id).await?;
        let (token, price_usd, onchain) = tokio::join!(
            self.token_metadata(&airdrop.mint),
            self.token_price(&airdrop.mint),
            self.onchain_distributor(&airdrop),
        );
        Ok(AirdropDetail {
            kind: airdrop.kind(),
            amount_claimed: airdrop.amount_claimed(),
            progress: airdrop.claim_progress(),
            token,
            price_usd,
            onchain,
            airdrop,
        })
    }

    /// Metadata for a mint, degrading to a placeholder when the service has
    /// no entry.
    pub async fn token_metadata(&self, mint: &str) -> TokenMetadata {
        let result = self
            .metadata
            .get_or_fetch(&mint.to_string(), || self.api.token_metadata(mint))
            .await;
        match result {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("error fetching metadata for {}: {:?}", mint, e);
                TokenMetadata::placeholder(mint)
            }
        }
    }

    /// USD price for a mint, degrading to 0.0 when unavailable.
    pub async fn token_price(&self, mint: &str) -> f64 {
        let result = self
            .prices
            .get_or_fetch(&mint.to_string(), || self.api.token_price(mint))
            .await;
        match result {
            Ok(price) => price,
            Err(e) => {
                warn!("error fetching price for {}: {:?}", mint, e);
                0.0
            }
        }
    }

    async fn onchain_distributor(&self, airdrop: &Airdrop) -> Option<MerkleDistributor> {
        if !airdrop.is_on_chain {
            return None;
        }
        let address = match Pubkey::from_str(&airdrop.address) {
            Ok(address) => address,
            Err(e) => {
                warn!("invalid distributor address {}: {:?}", airdrop.address, e);
                return None;
            }
        };
        match self.distributor.distributor(&address).await {
            Ok(distributor) => Some(distributor),
            Err(e) => {
                warn!("error reading distributor {}: {:?}", address, e);
                None
            }
        }
    }

    /// Everything the wallet can still claim, joined with airdrop records.
    /// Allocations whose airdrop the API no longer returns are kept with an
    /// empty record rather than dropped.
    #[instrument(skip(self))]
    pub async fn claimable(&self, wallet: &Pubkey) -> Result<Vec<ClaimableAirdrop>> {
        let address = wallet.to_string();
        let claimants = self
            .claimables
            .get_or_fetch(&address, || self.api.claimable_airdrops(&address, 100))
            .await?;

        let mut entries = Vec::with_capacity(claimants.len());
        for claimant in claimants {
            let airdrop = match self.airdrop(&claimant.distributor_address).await {
                Ok(airdrop) => Some(airdrop),
                Err(Error::NotFound(_)) => None,
                Err(e) => return Err(e),
            };
            entries.push(ClaimableAirdrop { claimant, airdrop });
        }
        Ok(entries)
    }

    /// The wallet's standing for one airdrop.
    #[instrument(skip(self))]
    pub async fn eligibility(&self, airdrop_id: &str, wallet: &Pubkey) -> Result<Eligibility> {
        let claimant = self.claimant(airdrop_id, wallet).await?;
        resolve_eligibility(&self.distributor, claimant.as_ref(), Self::now_ts()).await
    }

    async fn claimant(&self, airdrop_id: &str, wallet: &Pubkey) -> Result<Option<Claimant>> {
        let address = wallet.to_string();
        let key = (airdrop_id.to_string(), address.clone());
        self.claimants
            .get_or_fetch(&key, || self.api.claimant(airdrop_id, &address))
            .await
    }

    /// Registers the recipient list with the API and puts the distributor
    /// on-chain, signed by `keypair` as admin.
    #[instrument(skip(self, form, recipients, keypair), fields(name = %form.name))]
    pub async fn create_airdrop(
        &self,
        form: &CreateAirdropForm,
        recipients: Vec<Recipient>,
        keypair: &Keypair,
    ) -> Result<CreatedAirdrop> {
        let curr_ts = Self::now_ts();
        form.validate(&recipients, curr_ts)?;

        let mint = form.resolved_mint();
        let root = self.api.create_merkle_root(&form.name, &mint, recipients).await?;

        let (start_ts, end_ts) = form.vesting_window(curr_ts);
        let clawback_base = if end_ts > 0 { end_ts } else { curr_ts };
        let params = CreateDistributorParams {
            mint: Pubkey::from_str(&root.mint)?,
            version: root.version,
            root: root.merkle_root,
            max_total_claim: root.max_total_claim,
            max_num_nodes: root.max_num_nodes,
            start_vesting_ts: start_ts,
            end_vesting_ts: end_ts,
            clawback_start_ts: clawback_base + CLAWBACK_DELAY,
            unlock_period: form.unlock_interval.seconds(),
            claims_closable_by_admin: form.cancellable,
            claims_closable_by_claimant: false,
            claims_limit: if form.single_claim { 1 } else { 0 },
        };

        let outcome = self.distributor.create(&params, keypair).await?;
        info!("airdrop {} on distributor {}", root.address, outcome.distributor);
        self.airdrops.invalidate(&root.address).await;

        Ok(CreatedAirdrop {
            address: root.address,
            distributor: outcome.distributor,
            signature: outcome.signature,
        })
    }

    /// Claims the wallet's allocation in one airdrop.
    #[instrument(skip(self, keypair))]
    pub async fn claim(&self, airdrop_id: &str, keypair: &Keypair) -> Result<Signature> {
        let wallet = keypair.pubkey();
        let claimant = self
            .claimant(airdrop_id, &wallet)
            .await?
            .ok_or_else(|| Error::NotFound(format!("allocation for {wallet} in airdrop {airdrop_id}")))?;

        let params = ClaimParams::try_from(&claimant)?;
        let signature = self.distributor.claim(&params, keypair).await?;
        info!("claimed airdrop {} with signature {}", airdrop_id, signature);

        self.airdrops.invalidate(&airdrop_id.to_string()).await;
        self.claimables.invalidate(&wallet.to_string()).await;
        self.claimants
            .invalidate(&(airdrop_id.to_string(), wallet.to_string()))
            .await;
        Ok(signature)
    }

    /// SOL and SPL token balances for a wallet, with token metadata joined
    /// in for display.
    #[instrument(skip(self))]
    pub async fn balances(&self, wallet: &Pubkey) -> Result<WalletBalances> {
        let sol = balances::sol_balance(self.distributor.rpc(), wallet).await?;
        let raw_tokens = balances::token_balances(self.distributor.rpc(), wallet).await?;

        let mut tokens = Vec::with_capacity(raw_tokens.len());
        for raw in raw_tokens {
            let metadata = self.token_metadata(&raw.mint).await;
            tokens.push(TokenBalance::new(raw, &metadata));
        }
        Ok(WalletBalances { sol, tokens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_form() -> CreateAirdropForm {
        CreateAirdropForm {
            name: "Season One".to_string(),
            mint: "So11111111111111111111111111111111111111112".to_string(),
            kind: AirdropKind::Instant,
            start_ts: None,
            end_ts: None,
            unlock_interval: UnlockInterval::Daily,
            cancellable: false,
            single_claim: false,
        }
    }

    fn test_recipients() -> Vec<Recipient> {
        vec![Recipient {
            address: "addrX".to_string(),
            amount: "1000".to_string(),
        }]
    }

    fn validation_message(result: Result<()>) -> String {
        match result.unwrap_err() {
            Error::Validation(message) => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_form().validate(&test_recipients(), 1000).is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut form = test_form();
        form.name = "  ".to_string();
        assert_eq!(
            validation_message(form.validate(&test_recipients(), 1000)),
            "Missing airdrop name"
        );

        let mut form = test_form();
        form.mint = String::new();
        assert_eq!(
            validation_message(form.validate(&test_recipients(), 1000)),
            "Missing token selection"
        );

        assert_eq!(
            validation_message(test_form().validate(&[], 1000)),
            "No recipients uploaded"
        );
    }

    #[test]
    fn test_validate_vested_dates() {
        let mut form = test_form();
        form.kind = AirdropKind::Vested;
        assert_eq!(
            validation_message(form.validate(&test_recipients(), 1000)),
            "Missing end date for vested airdrop"
        );

        form.start_ts = Some(2000);
        form.end_ts = Some(1500);
        assert_eq!(
            validation_message(form.validate(&test_recipients(), 1000)),
            "End date must be after start date"
        );

        form.start_ts = None;
        form.end_ts = Some(500);
        assert_eq!(
            validation_message(form.validate(&test_recipients(), 1000)),
            "End date must be in the future"
        );

        form.start_ts = Some(2000);
        form.end_ts = Some(3000);
        assert!(form.validate(&test_recipients(), 1000).is_ok());
    }

    #[test]
    fn test_vesting_window() {
        let form = test_form();
        assert_eq!(form.vesting_window(1000), (0, 0));

        let mut vested = test_form();
        vested.kind = AirdropKind::Vested;
        vested.start_ts = Some(2000);
        vested.end_ts = Some(3000);
        assert_eq!(vested.vesting_window(1000), (2000, 3000));

        // Past start dates collapse to zero so vesting runs from creation.
        vested.start_ts = Some(500);
        assert_eq!(vested.vesting_window(1000), (0, 3000));

        vested.start_ts = Some(1000);
        assert_eq!(vested.vesting_window(1000), (1000, 3000));

        vested.start_ts = None;
        assert_eq!(vested.vesting_window(1000), (0, 3000));
    }

    #[test]
    fn test_resolved_mint() {
        let mut form = test_form();
        assert_eq!(form.resolved_mint(), form.mint);

        form.mint = "native".to_string();
        assert_eq!(form.resolved_mint(), spl_token::native_mint::ID.to_string());
    }

    #[test]
    fn test_unlock_interval() {
        assert_eq!("daily".parse::<UnlockInterval>().unwrap(), UnlockInterval::Daily);
        assert_eq!(
            "monthly".parse::<UnlockInterval>().unwrap(),
            UnlockInterval::Monthly
        );
        assert!("hourly".parse::<UnlockInterval>().is_err());

        assert_eq!(UnlockInterval::Daily.seconds(), 86_400);
        assert_eq!(UnlockInterval::Weekly.seconds(), 604_800);
        assert_eq!(UnlockInterval::Monthly.seconds(), 2_592_000);
        assert_eq!(UnlockInterval::Weekly.to_string(), "weekly");
    }

    fn test_detail(onchain: Option<MerkleDistributor>, kind: AirdropKind) -> AirdropDetail {
        AirdropDetail {
            airdrop: Airdrop {
                chain: "SOLANA".to_string(),
                mint: "mint".to_string(),
                version: 0,
                address: "addr".to_string(),
                sender: "sender".to_string(),
                name: "drop".to_string(),
                max_num_nodes: 1,
                max_total_claim: 1_500_000,
                total_amount_unlocked: 0,
                total_amount_locked: 0,
                is_active: true,
                is_on_chain: true,
                is_verified: false,
                is_aligned: false,
                merkle_root: None,
                clawback_dt: None,
            },
            kind,
            amount_claimed: 0,
            progress: 0.0,
            token: TokenMetadata::placeholder("mint"),
            price_usd: 0.0,
            onchain,
        }
    }

    #[test]
    fn test_vesting_progress() {
        let distributor = MerkleDistributor {
            start_ts: 100,
            end_ts: 200,
            ..Default::default()
        };
        let detail = test_detail(Some(distributor), AirdropKind::Vested);
        assert_eq!(detail.vesting_progress(150), Some(50.0));
        assert_eq!(detail.vesting_progress(250), Some(100.0));

        let instant = test_detail(None, AirdropKind::Instant);
        assert_eq!(instant.vesting_progress(150), None);
    }

    #[test]
    fn test_total_value_usd() {
        let mut detail = test_detail(None, AirdropKind::Instant);
        assert_eq!(detail.total_value_usd(), None);

        detail.price_usd = 2.0;
        detail.token.decimals = 6;
        assert_eq!(detail.total_value_usd(), Some(3.0));
    }
}
