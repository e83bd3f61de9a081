mod instructions;

use std::path::PathBuf;

use airdrop_client::{
    config::{ClientConfig, Cluster},
    dashboard::{Dashboard, UnlockInterval},
    error::Error,
};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use instructions::*;
use solana_sdk::{
    pubkey::Pubkey,
    signer::{
        keypair::{read_keypair_file, Keypair},
        Signer,
    },
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Distribution API url
    #[clap(long, env, default_value = "http://localhost:3000")]
    pub api_url: String,

    /// RPC url
    #[clap(long, env, default_value = "https://api.devnet.solana.com")]
    pub rpc_url: String,

    /// Merkle distributor program id
    #[clap(long, env)]
    pub program_id: Pubkey,

    /// Wallet keypair, needed for create and claim
    #[clap(long, env)]
    pub keypair_path: Option<PathBuf>,

    /// Cluster the API should resolve metadata and prices against
    #[clap(long, env, default_value = "devnet")]
    pub cluster: Cluster,
}

impl Args {
    fn config(&self) -> ClientConfig {
        ClientConfig::new(
            self.api_url.clone(),
            self.rpc_url.clone(),
            self.program_id,
            self.cluster,
        )
    }

    fn dashboard(&self) -> Dashboard {
        Dashboard::new(&self.config())
    }

    fn keypair(&self) -> Result<Keypair> {
        let path = self.keypair_path.as_ref().ok_or(Error::WalletRequired)?;
        read_keypair_file(path)
            .map_err(|e| anyhow!("Failed reading keypair file {}: {e}", path.display()))
    }

    /// Wallet to act on: the explicit address when given, the keypair's
    /// public key otherwise.
    fn wallet(&self, address: &Option<Pubkey>) -> Result<Pubkey> {
        match address {
            Some(address) => Ok(*address),
            None => Ok(self.keypair()?.pubkey()),
        }
    }
}

pub fn unix_ts() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List active airdrops
    List(ListArgs),
    /// Show one airdrop with token metadata, price, and chain state
    Show(ShowArgs),
    /// List airdrops a wallet can claim from
    Claimable(ClaimableArgs),
    /// Check a wallet's standing for one airdrop
    Eligibility(EligibilityArgs),
    /// Create an airdrop from a recipient CSV
    Create(CreateArgs),
    /// Claim tokens from an airdrop
    Claim(ClaimArgs),
    /// Show a wallet's SOL and token balances
    Balances(BalancesArgs),
    /// Generate a recipient CSV with random addresses
    CreateDummyCsv(CreateDummyCsvArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Page size
    #[clap(long, env, default_value_t = 20)]
    pub limit: u64,

    /// Page offset
    #[clap(long, env, default_value_t = 0)]
    pub offset: u64,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Airdrop id (distributor address)
    #[clap(long, env)]
    pub airdrop: String,
}

#[derive(Parser, Debug)]
pub struct ClaimableArgs {
    /// Wallet address, defaults to the keypair
    #[clap(long, env)]
    pub address: Option<Pubkey>,
}

#[derive(Parser, Debug)]
pub struct EligibilityArgs {
    /// Airdrop id (distributor address)
    #[clap(long, env)]
    pub airdrop: String,

    /// Wallet address, defaults to the keypair
    #[clap(long, env)]
    pub address: Option<Pubkey>,
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Airdrop name
    #[clap(long, env)]
    pub name: String,

    /// Mint address, or "native" for wrapped SOL
    #[clap(long, env)]
    pub mint: String,

    /// Recipient CSV path
    #[clap(long, env)]
    pub csv_path: PathBuf,

    /// Vest the allocation instead of unlocking it all at once
    #[clap(long, env)]
    pub vested: bool,

    /// Vesting start (Unix Timestamp), defaults to creation time
    #[clap(long, env)]
    pub start_ts: Option<i64>,

    /// Vesting end (Unix Timestamp), required for vested airdrops
    #[clap(long, env)]
    pub end_ts: Option<i64>,

    /// Vesting granularity: daily, weekly, or monthly
    #[clap(long, env, default_value = "daily")]
    pub unlock_interval: UnlockInterval,

    /// Let the admin close claim accounts later
    #[clap(long, env)]
    pub cancellable: bool,

    /// Allow more than one claim per wallet
    #[clap(long, env)]
    pub multiple_claims: bool,
}

#[derive(Parser, Debug)]
pub struct ClaimArgs {
    /// Airdrop id (distributor address)
    #[clap(long, env)]
    pub airdrop: String,
}

#[derive(Parser, Debug)]
pub struct BalancesArgs {
    /// Wallet address, defaults to the keypair
    #[clap(long, env)]
    pub address: Option<Pubkey>,
}

#[derive(Parser, Debug)]
pub struct CreateDummyCsvArgs {
    /// Output CSV path
    #[clap(long, env)]
    pub csv_path: PathBuf,

    /// Number of recipient rows
    #[clap(long, env, default_value_t = 10)]
    pub num_records: u64,

    /// Amount per recipient
    #[clap(long, env, default_value_t = 1000)]
    pub amount: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().init();

    match &args.command {
        Commands::List(list_args) => {
            process_list(&args, list_args).await?;
        }
        Commands::Show(show_args) => {
            process_show(&args, show_args).await?;
        }
        Commands::Claimable(claimable_args) => {
            process_claimable(&args, claimable_args).await?;
        }
        Commands::Eligibility(eligibility_args) => {
            process_eligibility(&args, eligibility_args).await?;
        }
        Commands::Create(create_args) => {
            process_create(&args, create_args).await?;
        }
        Commands::Claim(claim_args) => {
            process_claim(&args, claim_args).await?;
        }
        Commands::Balances(balances_args) => {
            process_balances(&args, balances_args).await?;
        }
        Commands::CreateDummyCsv(dummy_csv_args) => {
            process_create_dummy_csv(dummy_csv_args)?;
        }
    }
    Ok(())
}
