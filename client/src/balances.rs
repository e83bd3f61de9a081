//! Wallet balance lookups over RPC.

use serde::Deserialize;
use solana_account_decoder::UiAccountData;
use solana_program::pubkey::Pubkey;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::request::TokenAccountsFilter;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use tracing::warn;

use crate::{error::Result, types::TokenMetadata};

/// Token balance straight from a token account, before metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTokenBalance {
    pub mint: String,
    pub amount: f64,
    pub decimals: u8,
}

/// Token balance decorated with mint metadata for display.
#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub mint: String,
    pub amount: f64,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
}

impl TokenBalance {
    pub fn new(raw: RawTokenBalance, metadata: &TokenMetadata) -> Self {
        TokenBalance {
            mint: raw.mint,
            amount: raw.amount,
            decimals: raw.decimals,
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            image: metadata.image.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletBalances {
    pub sol: f64,
    pub tokens: Vec<TokenBalance>,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAccount {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAmount {
    decimals: u8,
    #[serde(default)]
    ui_amount: Option<f64>,
}

pub async fn sol_balance(rpc: &RpcClient, owner: &Pubkey) -> Result<f64> {
    let lamports = rpc.get_balance(owner).await?;
    Ok(lamports as f64 / LAMPORTS_PER_SOL as f64)
}

/// Lists the wallet's SPL token balances, skipping empty accounts.
pub async fn token_balances(rpc: &RpcClient, owner: &Pubkey) -> Result<Vec<RawTokenBalance>> {
    let accounts = rpc
        .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::ID))
        .await?;

    let mut balances = Vec::new();
    for keyed in accounts {
        let parsed = match keyed.account.data {
            UiAccountData::Json(parsed) => parsed.parsed,
            _ => continue,
        };
        let account: ParsedTokenAccount = match serde_json::from_value(parsed) {
            Ok(account) => account,
            Err(e) => {
                warn!("error parsing token account {}: {:?}", keyed.pubkey, e);
                continue;
            }
        };
        let amount = account.info.token_amount.ui_amount.unwrap_or(0.0);
        if amount <= 0.0 {
            continue;
        }
        balances.push(RawTokenBalance {
            mint: account.info.mint,
            amount,
            decimals: account.info.token_amount.decimals,
        });
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_token_account_json() {
        let data = r#"{
            "info": {
                "isNative": false,
                "mint": "BULRqL3U2jPgwvz6HYCyBVq9BMtK94Y1Nz98KQop23aD",
                "owner": "55pPhcCcp8gEKvKWr1JUkAcdwMeemmNhTHmkWNR9sJib",
                "state": "initialized",
                "tokenAmount": {
                    "amount": "1500000",
                    "decimals": 6,
                    "uiAmount": 1.5,
                    "uiAmountString": "1.5"
                }
            },
            "type": "account"
        }"#;

        let account: ParsedTokenAccount =
            serde_json::from_str(data).expect("Failed to parse token account");
        assert_eq!(account.info.mint, "BULRqL3U2jPgwvz6HYCyBVq9BMtK94Y1Nz98KQop23aD");
        assert_eq!(account.info.token_amount.decimals, 6);
        assert_eq!(account.info.token_amount.ui_amount, Some(1.5));
    }

    #[test]
    fn test_null_ui_amount_tolerated() {
        let data = r#"{
            "info": {
                "mint": "BULRqL3U2jPgwvz6HYCyBVq9BMtK94Y1Nz98KQop23aD",
                "tokenAmount": {
                    "amount": "0",
                    "decimals": 6,
                    "uiAmount": null
                }
            }
        }"#;

        let account: ParsedTokenAccount =
            serde_json::from_str(data).expect("Failed to parse token account");
        assert_eq!(account.info.token_amount.ui_amount, None);
    }

    #[test]
    fn test_token_balance_from_metadata() {
        let raw = RawTokenBalance {
            mint: "mint".to_string(),
            amount: 2.5,
            decimals: 6,
        };
        let metadata = TokenMetadata::placeholder("mint");
        let balance = TokenBalance::new(raw, &metadata);
        assert_eq!(balance.name, "Unknown Token");
        assert_eq!(balance.amount, 2.5);
    }
}
