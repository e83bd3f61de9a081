//! Wallet eligibility for an airdrop, resolved from chain state.
//!
//! The claim status account is the source of truth for whether a wallet has
//! claimed: present and decodable means claimed, anything else means not yet
//! claimed. Allocation amounts come from the API's claimant record.

use solana_program::pubkey::Pubkey;
use std::str::FromStr;
use tracing::warn;

use crate::{
    distributor::DistributorClient,
    error::{Error, Result},
    math,
    state::{ClaimStatus, MerkleDistributor},
    types::Claimant,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    /// No allocation for this wallet.
    NotEligible,
    /// Allocated and not claimed yet.
    Eligible {
        amount_unlocked: u64,
        amount_locked: u64,
        /// Claimable right now: the unlocked allocation plus whatever has
        /// vested so far.
        amount_claimable: u64,
    },
    /// Already claimed at least once.
    Claimed {
        amount_withdrawn: u64,
        /// Vested but not yet withdrawn.
        amount_claimable: u64,
        last_claim_ts: i64,
    },
    /// The distributor was clawed back; nothing can be claimed anymore.
    Expired {
        amount_unlocked: u64,
        amount_locked: u64,
        amount_withdrawn: u64,
    },
}

impl Eligibility {
    pub fn is_claimable(&self) -> bool {
        match self {
            Eligibility::Eligible { .. } => true,
            Eligibility::Claimed {
                amount_claimable, ..
            } => *amount_claimable > 0,
            _ => false,
        }
    }
}

/// Resolves a wallet's standing for one airdrop. `claimant` of None short
/// circuits to NotEligible without touching the RPC node.
pub async fn resolve_eligibility(
    client: &DistributorClient,
    claimant: Option<&Claimant>,
    curr_ts: i64,
) -> Result<Eligibility> {
    let claimant = match claimant {
        Some(claimant) => claimant,
        None => return Ok(Eligibility::NotEligible),
    };
    let distributor_pubkey = Pubkey::from_str(&claimant.distributor_address)?;
    let claimant_pubkey = Pubkey::from_str(&claimant.address)?;
    let claim_status = client.claim_status_address(&claimant_pubkey, &distributor_pubkey);

    let mut accounts = client
        .rpc()
        .get_multiple_accounts(&[distributor_pubkey, claim_status])
        .await?;
    let claim_status_account = accounts.pop().flatten();
    let distributor_account = accounts
        .pop()
        .flatten()
        .ok_or_else(|| Error::Distributor("distributor not found on-chain".to_string()))?;
    let distributor = MerkleDistributor::try_deserialize(&distributor_account.data)?;

    decide(
        claimant,
        &distributor,
        claim_status_account.as_ref().map(|a| a.data.as_slice()),
        curr_ts,
    )
}

fn decide(
    claimant: &Claimant,
    distributor: &MerkleDistributor,
    claim_status_data: Option<&[u8]>,
    curr_ts: i64,
) -> Result<Eligibility> {
    if distributor.clawed_back {
        let amount_withdrawn = claim_status_data
            .and_then(|data| match ClaimStatus::try_deserialize(data) {
                Ok(status) => Some(status.amount_withdrawn()),
                Err(e) => {
                    warn!("error reading ClaimStatus: {:?}", e);
                    None
                }
            })
            .unwrap_or(0);
        return Ok(Eligibility::Expired {
            amount_unlocked: claimant.amount_unlocked,
            amount_locked: claimant.amount_locked,
            amount_withdrawn,
        });
    }

    match claim_status_data {
        Some(data) => match ClaimStatus::try_deserialize(data) {
            Ok(status) => {
                let limit_reached = distributor.claims_limit > 0
                    && status.claims_count >= distributor.claims_limit;
                let amount_claimable = if limit_reached {
                    0
                } else {
                    status.amount_withdrawable(curr_ts, distributor.start_ts, distributor.end_ts)?
                };
                Ok(Eligibility::Claimed {
                    amount_withdrawn: status.amount_withdrawn(),
                    amount_claimable,
                    last_claim_ts: status.last_claim_ts,
                })
            }
            Err(e) => {
                warn!("error reading ClaimStatus: {:?}", e);
                eligible(claimant, distributor, curr_ts)
            }
        },
        None => eligible(claimant, distributor, curr_ts),
    }
}

fn eligible(
    claimant: &Claimant,
    distributor: &MerkleDistributor,
    curr_ts: i64,
) -> Result<Eligibility> {
    let vested = math::unlocked_amount(
        claimant.amount_locked,
        curr_ts,
        distributor.start_ts,
        distributor.end_ts,
    )?;
    Ok(Eligibility::Eligible {
        amount_unlocked: claimant.amount_unlocked,
        amount_locked: claimant.amount_locked,
        amount_claimable: claimant
            .amount_unlocked
            .checked_add(vested)
            .ok_or(Error::Arithmetic)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::AnchorSerialize;

    fn test_claimant(unlocked: u64, locked: u64) -> Claimant {
        Claimant {
            chain: "SOLANA".to_string(),
            distributor_address: Pubkey::new_unique().to_string(),
            address: Pubkey::new_unique().to_string(),
            amount_unlocked: unlocked,
            amount_locked: locked,
            amount_claimed: 0,
            proof: vec![],
        }
    }

    fn test_distributor(start_ts: i64, end_ts: i64) -> MerkleDistributor {
        MerkleDistributor {
            start_ts,
            end_ts,
            ..Default::default()
        }
    }

    fn claim_status_bytes(status: &ClaimStatus) -> Vec<u8> {
        let mut data = ClaimStatus::discriminator().to_vec();
        data.extend(status.try_to_vec().expect("Failed to serialize"));
        data
    }

    #[test]
    fn test_unclaimed_instant() {
        let claimant = test_claimant(1000, 0);
        let distributor = test_distributor(0, 0);

        let eligibility = decide(&claimant, &distributor, None, 100).expect("Failed to decide");
        assert_eq!(
            eligibility,
            Eligibility::Eligible {
                amount_unlocked: 1000,
                amount_locked: 0,
                amount_claimable: 1000,
            }
        );
        assert!(eligibility.is_claimable());
    }

    #[test]
    fn test_unclaimed_vested_midway() {
        let claimant = test_claimant(0, 1000);
        let distributor = test_distributor(100, 200);

        let eligibility = decide(&claimant, &distributor, None, 150).expect("Failed to decide");
        assert_eq!(
            eligibility,
            Eligibility::Eligible {
                amount_unlocked: 0,
                amount_locked: 1000,
                amount_claimable: 500,
            }
        );
    }

    #[test]
    fn test_claimed_account_present() {
        let claimant = test_claimant(400, 600);
        let distributor = test_distributor(100, 200);
        let status = ClaimStatus {
            claimant: Pubkey::new_unique(),
            locked_amount: 600,
            locked_amount_withdrawn: 0,
            unlocked_amount: 400,
            last_claim_ts: 120,
            claims_count: 1,
        };

        let data = claim_status_bytes(&status);
        let eligibility =
            decide(&claimant, &distributor, Some(&data), 150).expect("Failed to decide");
        assert_eq!(
            eligibility,
            Eligibility::Claimed {
                amount_withdrawn: 400,
                amount_claimable: 300,
                last_claim_ts: 120,
            }
        );
        assert!(eligibility.is_claimable());
    }

    #[test]
    fn test_claims_limit_reached() {
        let claimant = test_claimant(400, 600);
        let mut distributor = test_distributor(100, 200);
        distributor.claims_limit = 1;
        let status = ClaimStatus {
            locked_amount: 600,
            unlocked_amount: 400,
            last_claim_ts: 120,
            claims_count: 1,
            ..Default::default()
        };

        let data = claim_status_bytes(&status);
        let eligibility =
            decide(&claimant, &distributor, Some(&data), 150).expect("Failed to decide");
        assert_eq!(
            eligibility,
            Eligibility::Claimed {
                amount_withdrawn: 400,
                amount_claimable: 0,
                last_claim_ts: 120,
            }
        );
        assert!(!eligibility.is_claimable());
    }

    #[test]
    fn test_undecodable_claim_account_stays_eligible() {
        let claimant = test_claimant(1000, 0);
        let distributor = test_distributor(0, 0);
        let garbage = vec![0xffu8; 16];

        let eligibility =
            decide(&claimant, &distributor, Some(&garbage), 100).expect("Failed to decide");
        assert!(matches!(eligibility, Eligibility::Eligible { .. }));
    }

    #[test]
    fn test_clawed_back_without_claim() {
        let claimant = test_claimant(1000, 500);
        let mut distributor = test_distributor(0, 0);
        distributor.clawed_back = true;

        let eligibility = decide(&claimant, &distributor, None, 100).expect("Failed to decide");
        assert_eq!(
            eligibility,
            Eligibility::Expired {
                amount_unlocked: 1000,
                amount_locked: 500,
                amount_withdrawn: 0,
            }
        );
        assert!(!eligibility.is_claimable());
    }

    #[test]
    fn test_clawed_back_with_claim() {
        let claimant = test_claimant(1000, 500);
        let mut distributor = test_distributor(0, 0);
        distributor.clawed_back = true;
        let status = ClaimStatus {
            locked_amount: 500,
            locked_amount_withdrawn: 100,
            unlocked_amount: 1000,
            ..Default::default()
        };

        let data = claim_status_bytes(&status);
        let eligibility =
            decide(&claimant, &distributor, Some(&data), 100).expect("Failed to decide");
        assert_eq!(
            eligibility,
            Eligibility::Expired {
                amount_unlocked: 1000,
                amount_locked: 500,
                amount_withdrawn: 1100,
            }
        );
    }
}
