//! On-chain account layouts for the merkle distributor program.
//!
//! The program id is configuration rather than a compile-time constant, so
//! accounts are decoded here with an explicit discriminator check instead of
//! the `#[account]` attribute.

use anchor_lang::{prelude::borsh, AnchorDeserialize, AnchorSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    error::{Error, Result},
    math,
};

/// Computes an 8-byte Anchor discriminator from a namespace and name.
pub fn sighash(namespace: &str, name: &str) -> [u8; 8] {
    let preimage = format!("{namespace}:{name}");
    let mut hash = [0u8; 8];
    hash.copy_from_slice(&solana_program::hash::hash(preimage.as_bytes()).to_bytes()[..8]);
    hash
}

fn try_deserialize<T: AnchorDeserialize>(account_name: &str, data: &[u8]) -> Result<T> {
    if data.len() < 8 || data[..8] != sighash("account", account_name) {
        return Err(Error::Account(format!(
            "invalid account discriminator for {account_name}"
        )));
    }
    T::deserialize(&mut &data[8..]).map_err(|e| Error::Account(e.to_string()))
}

/// State for the account which distributes tokens.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct MerkleDistributor {
    /// Bump seed.
    pub bump: u8,
    /// Version of the airdrop
    pub version: u64,
    /// The 256-bit merkle root.
    pub root: [u8; 32],
    /// Mint of the token to be distributed.
    pub mint: Pubkey,
    /// Token Address of the vault
    pub token_vault: Pubkey,
    /// Maximum number of tokens that can ever be claimed from this distributor.
    pub max_total_claim: u64,
    /// Maximum number of nodes in the tree.
    pub max_num_nodes: u64,
    /// Total amount of tokens that have been claimed.
    pub total_amount_claimed: u64,
    /// Number of nodes that have been claimed.
    pub num_nodes_claimed: u64,
    /// Lockup time start (Unix Timestamp)
    pub start_ts: i64,
    /// Lockup time end (Unix Timestamp)
    pub end_ts: i64,
    /// Clawback start (Unix Timestamp)
    pub clawback_start_ts: i64,
    /// Granularity of the vesting schedule in seconds.
    pub unlock_period: i64,
    /// Clawback receiver
    pub clawback_receiver: Pubkey,
    /// Admin wallet
    pub admin: Pubkey,
    /// Whether or not the distributor has been clawed back
    pub clawed_back: bool,
    /// Whether admin can close claim accounts.
    pub claims_closable_by_admin: bool,
    /// Whether claimants can close their own claim accounts.
    pub claims_closable_by_claimant: bool,
    /// Maximum number of claims per claimant, 0 for unlimited.
    pub claims_limit: u16,
}

impl MerkleDistributor {
    pub const ACCOUNT_NAME: &'static str = "MerkleDistributor";

    pub fn discriminator() -> [u8; 8] {
        sighash("account", Self::ACCOUNT_NAME)
    }

    /// Decodes a distributor account, discriminator included. Trailing bytes
    /// past the struct layout are tolerated.
    pub fn try_deserialize(data: &[u8]) -> Result<Self> {
        try_deserialize(Self::ACCOUNT_NAME, data)
    }
}

/// Holds whether or not a claimant has claimed tokens.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct ClaimStatus {
    /// Authority that claimed the tokens.
    pub claimant: Pubkey,
    /// Locked amount
    pub locked_amount: u64,
    /// Locked amount withdrawn
    pub locked_amount_withdrawn: u64,
    /// Unlocked amount
    pub unlocked_amount: u64,
    /// Timestamp of the most recent claim (Unix Timestamp)
    pub last_claim_ts: i64,
    /// Number of claims made against this account.
    pub claims_count: u16,
}

impl ClaimStatus {
    pub const ACCOUNT_NAME: &'static str = "ClaimStatus";

    pub fn discriminator() -> [u8; 8] {
        sighash("account", Self::ACCOUNT_NAME)
    }

    pub fn try_deserialize(data: &[u8]) -> Result<Self> {
        try_deserialize(Self::ACCOUNT_NAME, data)
    }

    /// Total amount unlocked at `curr_ts` given the vesting window.
    pub fn unlocked_amount(&self, curr_ts: i64, start_ts: i64, end_ts: i64) -> Result<u64> {
        math::unlocked_amount(self.locked_amount, curr_ts, start_ts, end_ts)
    }

    /// Returns amount withdrawable, factoring in unlocked tokens and previous withdraws.
    pub fn amount_withdrawable(&self, curr_ts: i64, start_ts: i64, end_ts: i64) -> Result<u64> {
        self.unlocked_amount(curr_ts, start_ts, end_ts)?
            .checked_sub(self.locked_amount_withdrawn)
            .ok_or(Error::Arithmetic)
    }

    /// Everything the claimant has taken out so far.
    pub fn amount_withdrawn(&self) -> u64 {
        self.unlocked_amount
            .saturating_add(self.locked_amount_withdrawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_bytes<T: AnchorSerialize>(discriminator: [u8; 8], state: &T) -> Vec<u8> {
        let mut data = discriminator.to_vec();
        data.extend(state.try_to_vec().expect("Failed to serialize"));
        data
    }

    #[test]
    fn test_discriminators_are_distinct() {
        assert_ne!(
            MerkleDistributor::discriminator(),
            ClaimStatus::discriminator()
        );
        assert_eq!(
            MerkleDistributor::discriminator(),
            sighash("account", "MerkleDistributor")
        );
    }

    #[test]
    fn test_distributor_round_trip() {
        let distributor = MerkleDistributor {
            bump: 254,
            version: 7,
            root: [3u8; 32],
            mint: Pubkey::new_unique(),
            max_total_claim: 1_000_000,
            max_num_nodes: 50,
            start_ts: 100,
            end_ts: 200,
            clawback_start_ts: 300,
            unlock_period: 86_400,
            claims_limit: 1,
            ..Default::default()
        };

        let data = account_bytes(MerkleDistributor::discriminator(), &distributor);
        let parsed = MerkleDistributor::try_deserialize(&data).expect("Failed to deserialize");
        assert_eq!(parsed, distributor);
    }

    #[test]
    fn test_wrong_discriminator_rejected() {
        let data = account_bytes(ClaimStatus::discriminator(), &MerkleDistributor::default());
        assert!(MerkleDistributor::try_deserialize(&data).is_err());
    }

    #[test]
    fn test_short_data_rejected() {
        assert!(ClaimStatus::try_deserialize(&[0u8; 4]).is_err());
        assert!(ClaimStatus::try_deserialize(&[]).is_err());
    }

    #[test]
    fn test_trailing_bytes_tolerated() {
        let status = ClaimStatus {
            claimant: Pubkey::new_unique(),
            locked_amount: 500,
            unlocked_amount: 100,
            ..Default::default()
        };
        let mut data = account_bytes(ClaimStatus::discriminator(), &status);
        data.extend_from_slice(&[0u8; 64]);

        let parsed = ClaimStatus::try_deserialize(&data).expect("Failed to deserialize");
        assert_eq!(parsed, status);
    }

    #[test]
    fn test_amount_withdrawable_midway() {
        let status = ClaimStatus {
            claimant: Pubkey::new_unique(),
            locked_amount: 1000,
            locked_amount_withdrawn: 200,
            unlocked_amount: 0,
            last_claim_ts: 0,
            claims_count: 1,
        };

        // Halfway through vesting 500 is unlocked, 200 already withdrawn.
        let withdrawable = status
            .amount_withdrawable(150, 100, 200)
            .expect("Failed to compute");
        assert_eq!(withdrawable, 300);
    }

    #[test]
    fn test_amount_withdrawn() {
        let status = ClaimStatus {
            locked_amount_withdrawn: 250,
            unlocked_amount: 100,
            ..Default::default()
        };
        assert_eq!(status.amount_withdrawn(), 350);
    }
}
