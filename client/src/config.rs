use std::{fmt, str::FromStr};

use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::error::Error;

/// Cluster the dashboard runs against. The token endpoints of the
/// distribution API are cluster scoped and take this as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Mainnet,
    Devnet,
    Testnet,
    Local,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "mainnet",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::Local => "local",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "local" | "localnet" => Ok(Cluster::Local),
            other => Err(Error::Validation(format!("unknown cluster: {other}"))),
        }
    }
}

/// Connection settings for the distribution API and the chain.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the distribution API
    pub api_url: String,
    /// RPC url
    pub rpc_url: String,
    /// Distributor program id
    pub program_id: Pubkey,
    /// Cluster passed to the token endpoints
    pub cluster: Cluster,
}

impl ClientConfig {
    pub fn new(api_url: String, rpc_url: String, program_id: Pubkey, cluster: Cluster) -> Self {
        Self {
            api_url,
            rpc_url,
            program_id,
            cluster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_from_str() {
        assert_eq!("devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("MAINNET".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("localnet".parse::<Cluster>().unwrap(), Cluster::Local);
        assert!("goerli".parse::<Cluster>().is_err());
    }

    #[test]
    fn test_cluster_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Cluster::Devnet).unwrap(),
            "\"devnet\""
        );
        assert_eq!(Cluster::Mainnet.to_string(), "mainnet");
    }
}
