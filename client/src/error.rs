use solana_program::pubkey::ParsePubkeyError;
use solana_rpc_client_api::client_error::Error as RpcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Api Error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Csv Error at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Wallet keypair required for this operation")]
    WalletRequired,

    #[error("Http Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rpc Error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Parse Pubkey Error: {0}")]
    ParsePubkey(#[from] ParsePubkeyError),

    #[error("Account Error: {0}")]
    Account(String),

    #[error("Distributor Error: {0}")]
    Distributor(String),

    #[error("Serde Error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arithmetic Error")]
    Arithmetic,
}

pub type Result<T> = std::result::Result<T, Error>;
