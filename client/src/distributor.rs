//! RPC-side client for the merkle distributor program: PDA derivation,
//! instruction building, and the create/claim transaction flows.

use std::str::FromStr;

use anchor_lang::{prelude::borsh, AnchorSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    signature::Signature,
    signer::{keypair::Keypair, Signer},
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    state::{sighash, ClaimStatus, MerkleDistributor},
    types::Claimant,
};

pub fn get_merkle_distributor_pda(
    program_id: &Pubkey,
    mint: &Pubkey,
    version: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"MerkleDistributor".as_ref(),
            mint.as_ref(),
            version.to_le_bytes().as_ref(),
        ],
        program_id,
    )
}

pub fn get_claim_status_pda(
    program_id: &Pubkey,
    claimant: &Pubkey,
    distributor: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"ClaimStatus".as_ref(),
            claimant.to_bytes().as_ref(),
            distributor.to_bytes().as_ref(),
        ],
        program_id,
    )
}

/// Builds instruction data: 8-byte sighash followed by the borsh-encoded args.
fn instruction_data<T: AnchorSerialize>(name: &str, args: &T) -> Result<Vec<u8>> {
    let mut data = sighash("global", name).to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}

#[derive(AnchorSerialize)]
struct NewDistributorData {
    version: u64,
    root: [u8; 32],
    max_total_claim: u64,
    max_num_nodes: u64,
    start_vesting_ts: i64,
    end_vesting_ts: i64,
    clawback_start_ts: i64,
    unlock_period: i64,
    claims_closable_by_admin: bool,
    claims_closable_by_claimant: bool,
    claims_limit: u16,
}

#[derive(AnchorSerialize)]
struct NewClaimData {
    amount_unlocked: u64,
    amount_locked: u64,
    proof: Vec<[u8; 32]>,
}

#[derive(AnchorSerialize)]
struct ClaimLockedData {}

/// Everything needed to put a new distributor on-chain.
#[derive(Debug, Clone)]
pub struct CreateDistributorParams {
    pub mint: Pubkey,
    pub version: u64,
    pub root: [u8; 32],
    pub max_total_claim: u64,
    pub max_num_nodes: u64,
    pub start_vesting_ts: i64,
    pub end_vesting_ts: i64,
    pub clawback_start_ts: i64,
    pub unlock_period: i64,
    pub claims_closable_by_admin: bool,
    pub claims_closable_by_claimant: bool,
    pub claims_limit: u16,
}

/// Proof and amounts for one claimant, as the API hands them out.
#[derive(Debug, Clone)]
pub struct ClaimParams {
    pub distributor: Pubkey,
    pub amount_unlocked: u64,
    pub amount_locked: u64,
    pub proof: Vec<[u8; 32]>,
}

impl TryFrom<&Claimant> for ClaimParams {
    type Error = Error;

    fn try_from(claimant: &Claimant) -> Result<Self> {
        Ok(ClaimParams {
            distributor: Pubkey::from_str(&claimant.distributor_address)?,
            amount_unlocked: claimant.amount_unlocked,
            amount_locked: claimant.amount_locked,
            proof: claimant.proof.clone(),
        })
    }
}

/// Result of a create call. `signature` is None when the distributor already
/// existed with matching parameters.
#[derive(Debug)]
pub struct CreateOutcome {
    pub distributor: Pubkey,
    pub signature: Option<Signature>,
}

pub struct DistributorClient {
    rpc_client: RpcClient,
    program_id: Pubkey,
}

impl DistributorClient {
    pub fn new(rpc_url: &str, program_id: Pubkey) -> Self {
        Self {
            rpc_client: RpcClient::new_with_commitment(
                rpc_url.to_string(),
                CommitmentConfig::confirmed(),
            ),
            program_id,
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc_client
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn claim_status_address(&self, claimant: &Pubkey, distributor: &Pubkey) -> Pubkey {
        get_claim_status_pda(&self.program_id, claimant, distributor).0
    }

    /// Fetches and decodes a distributor account.
    pub async fn distributor(&self, address: &Pubkey) -> Result<MerkleDistributor> {
        let account = self.rpc_client.get_account(address).await?;
        MerkleDistributor::try_deserialize(&account.data)
    }

    /// Reads claim status accounts for `(claimant, distributor)` pairs.
    /// Undecodable accounts degrade to None.
    pub async fn get_claims(
        &self,
        pairs: &[(Pubkey, Pubkey)],
    ) -> Result<Vec<Option<ClaimStatus>>> {
        let addresses: Vec<Pubkey> = pairs
            .iter()
            .map(|(claimant, distributor)| self.claim_status_address(claimant, distributor))
            .collect();

        let mut claims = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(100) {
            let accounts = self.rpc_client.get_multiple_accounts(chunk).await?;
            for account in accounts {
                claims.push(account.and_then(|account| {
                    match ClaimStatus::try_deserialize(&account.data) {
                        Ok(status) => Some(status),
                        Err(e) => {
                            warn!("error reading ClaimStatus: {:?}", e);
                            None
                        }
                    }
                }));
            }
        }
        Ok(claims)
    }

    /// Builds the first-claim instructions for a claimant, or None when a
    /// claim status account already exists and claim_locked applies instead.
    pub async fn prepare_claim_instructions(
        &self,
        params: &ClaimParams,
        claimant: &Pubkey,
    ) -> Result<Option<Vec<Instruction>>> {
        let claim_status = self.claim_status_address(claimant, &params.distributor);
        let mut accounts = self
            .rpc_client
            .get_multiple_accounts(&[params.distributor, claim_status])
            .await?;
        let claim_status_account = accounts.pop().flatten();
        let distributor_account = accounts
            .pop()
            .flatten()
            .ok_or_else(|| Error::Distributor("distributor not found on-chain".to_string()))?;
        if claim_status_account.is_some() {
            return Ok(None);
        }
        let distributor = MerkleDistributor::try_deserialize(&distributor_account.data)?;

        let claimant_ata = get_associated_token_address(claimant, &distributor.mint);
        let mut ixs = vec![];
        if self
            .rpc_client
            .get_account_with_commitment(&claimant_ata, CommitmentConfig::confirmed())
            .await?
            .value
            .is_none()
        {
            ixs.push(create_associated_token_account(
                claimant,
                claimant,
                &distributor.mint,
                &spl_token::ID,
            ));
        }

        ixs.push(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(params.distributor, false),
                AccountMeta::new(claim_status, false),
                AccountMeta::new(distributor.token_vault, false),
                AccountMeta::new(claimant_ata, false),
                AccountMeta::new(*claimant, true),
                AccountMeta::new_readonly(spl_token::ID, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: instruction_data(
                "new_claim",
                &NewClaimData {
                    amount_unlocked: params.amount_unlocked,
                    amount_locked: params.amount_locked,
                    proof: params.proof.clone(),
                },
            )?,
        });
        Ok(Some(ixs))
    }

    /// Claims for the keypair's wallet. First claims go through new_claim;
    /// once a claim status account exists, vested balances come out through
    /// claim_locked.
    pub async fn claim(&self, params: &ClaimParams, keypair: &Keypair) -> Result<Signature> {
        let claimant = keypair.pubkey();
        match self.prepare_claim_instructions(params, &claimant).await? {
            Some(ixs) => self.send(&ixs, keypair).await,
            None => {
                info!("claim status exists, claiming unlocked tokens");
                let claim_status = self.claim_status_address(&claimant, &params.distributor);
                let distributor = self.distributor(&params.distributor).await?;
                let ix = Instruction {
                    program_id: self.program_id,
                    accounts: vec![
                        AccountMeta::new(params.distributor, false),
                        AccountMeta::new(claim_status, false),
                        AccountMeta::new(distributor.token_vault, false),
                        AccountMeta::new(
                            get_associated_token_address(&claimant, &distributor.mint),
                            false,
                        ),
                        AccountMeta::new(claimant, true),
                        AccountMeta::new_readonly(spl_token::ID, false),
                    ],
                    data: instruction_data("claim_locked", &ClaimLockedData {})?,
                };
                self.send(&[ix], keypair).await
            }
        }
    }

    async fn send(&self, ixs: &[Instruction], keypair: &Keypair) -> Result<Signature> {
        let blockhash = self.rpc_client.get_latest_blockhash().await?;
        let tx =
            Transaction::new_signed_with_payer(ixs, Some(&keypair.pubkey()), &[keypair], blockhash);
        Ok(self.rpc_client.send_and_confirm_transaction(&tx).await?)
    }

    /// Puts a distributor on-chain. When the account already exists its
    /// parameters are compared against `params` and no transaction is sent.
    pub async fn create(
        &self,
        params: &CreateDistributorParams,
        keypair: &Keypair,
    ) -> Result<CreateOutcome> {
        let admin = keypair.pubkey();
        let (distributor_pubkey, _bump) =
            get_merkle_distributor_pda(&self.program_id, &params.mint, params.version);
        let token_vault = get_associated_token_address(&distributor_pubkey, &params.mint);
        let clawback_receiver = get_associated_token_address(&admin, &params.mint);

        if let Some(account) = self
            .rpc_client
            .get_account_with_commitment(&distributor_pubkey, CommitmentConfig::confirmed())
            .await?
            .value
        {
            info!(
                "merkle distributor {} account exists, checking parameters",
                distributor_pubkey
            );
            check_distributor_matches(&account, params, &admin)?;
            return Ok(CreateOutcome {
                distributor: distributor_pubkey,
                signature: None,
            });
        }

        let mut ixs = vec![];
        if self
            .rpc_client
            .get_account_with_commitment(&token_vault, CommitmentConfig::confirmed())
            .await?
            .value
            .is_none()
        {
            ixs.push(create_associated_token_account(
                &admin,
                &distributor_pubkey,
                &params.mint,
                &spl_token::ID,
            ));
        }
        if self
            .rpc_client
            .get_account_with_commitment(&clawback_receiver, CommitmentConfig::confirmed())
            .await?
            .value
            .is_none()
        {
            ixs.push(create_associated_token_account(
                &admin,
                &admin,
                &params.mint,
                &spl_token::ID,
            ));
        }

        ixs.push(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(distributor_pubkey, false),
                AccountMeta::new(clawback_receiver, false),
                AccountMeta::new_readonly(params.mint, false),
                AccountMeta::new(token_vault, false),
                AccountMeta::new(admin, true),
                AccountMeta::new_readonly(system_program::ID, false),
                AccountMeta::new_readonly(spl_associated_token_account::ID, false),
                AccountMeta::new_readonly(spl_token::ID, false),
            ],
            data: instruction_data(
                "new_distributor",
                &NewDistributorData {
                    version: params.version,
                    root: params.root,
                    max_total_claim: params.max_total_claim,
                    max_num_nodes: params.max_num_nodes,
                    start_vesting_ts: params.start_vesting_ts,
                    end_vesting_ts: params.end_vesting_ts,
                    clawback_start_ts: params.clawback_start_ts,
                    unlock_period: params.unlock_period,
                    claims_closable_by_admin: params.claims_closable_by_admin,
                    claims_closable_by_claimant: params.claims_closable_by_claimant,
                    claims_limit: params.claims_limit,
                },
            )?,
        });

        match self.send(&ixs, keypair).await {
            Ok(signature) => {
                info!(
                    "done create merkle distributor version {} {:?}",
                    params.version, signature
                );
                Ok(CreateOutcome {
                    distributor: distributor_pubkey,
                    signature: Some(signature),
                })
            }
            Err(e) => {
                // double check someone didn't frontrun this transaction
                // with a malicious merkle root
                if let Some(account) = self
                    .rpc_client
                    .get_account_with_commitment(&distributor_pubkey, CommitmentConfig::processed())
                    .await?
                    .value
                {
                    check_distributor_matches(&account, params, &admin)?;
                    return Ok(CreateOutcome {
                        distributor: distributor_pubkey,
                        signature: None,
                    });
                }
                Err(e)
            }
        }
    }
}

/// Compares an on-chain distributor against the parameters we meant to set.
/// A mismatch means the account was created with different arguments,
/// potentially by someone else.
fn check_distributor_matches(
    account: &Account,
    params: &CreateDistributorParams,
    admin: &Pubkey,
) -> Result<()> {
    let distributor = MerkleDistributor::try_deserialize(&account.data)?;
    if distributor.root != params.root {
        return Err(Error::Distributor("root mismatch".to_string()));
    }
    if distributor.max_total_claim != params.max_total_claim {
        return Err(Error::Distributor("max_total_claim mismatch".to_string()));
    }
    if distributor.max_num_nodes != params.max_num_nodes {
        return Err(Error::Distributor("max_num_nodes mismatch".to_string()));
    }
    if distributor.start_ts != params.start_vesting_ts {
        return Err(Error::Distributor("start_ts mismatch".to_string()));
    }
    if distributor.end_ts != params.end_vesting_ts {
        return Err(Error::Distributor("end_ts mismatch".to_string()));
    }
    if distributor.clawback_start_ts != params.clawback_start_ts {
        return Err(Error::Distributor("clawback_start_ts mismatch".to_string()));
    }
    if distributor.admin != *admin {
        return Err(Error::Distributor("admin mismatch".to_string()));
    }
    Ok(())
}
