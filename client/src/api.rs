//! HTTP client for the distribution API.

use std::collections::HashMap;

use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::Cluster,
    error::{Error, Result},
    recipients::Recipient,
    types::{
        Airdrop, AirdropPage, Claimant, ClaimantPage, MerkleRootRequest, MerkleRootResponse,
        PriceResponse, SearchFilters, SearchInclude, SearchRequest, SearchSorter, TokenMetadata,
        TokenMetadataRequest,
    },
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cluster: Cluster,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(response.url().path().to_string()));
    }
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, cluster: Cluster) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cluster,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        parse_response(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(body).send().await?;
        parse_response(response).await
    }

    /// Lists active on-chain airdrops, newest first.
    pub async fn search_airdrops(
        &self,
        actor: &str,
        limit: u64,
        offset: u64,
    ) -> Result<AirdropPage> {
        let request = SearchRequest {
            actor: actor.to_string(),
            limit,
            offset,
            filters: SearchFilters {
                include: SearchInclude {
                    is_on_chain: true,
                    is_active: true,
                },
            },
            sorters: vec![SearchSorter {
                by: "id".to_string(),
                order: "desc".to_string(),
            }],
        };
        self.post("/airdrops/search", &request).await
    }

    /// Fetches one airdrop by its distributor address.
    pub async fn airdrop(&self, id: &str) -> Result<Airdrop> {
        let airdrops: Vec<Airdrop> = self.get(&format!("/airdrops/{id}")).await?;
        airdrops
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("airdrop {id}")))
    }

    /// All allocations a wallet can still get value out of.
    pub async fn claimable_airdrops(&self, address: &str, limit: u64) -> Result<Vec<Claimant>> {
        let page: ClaimantPage = self
            .get(&format!(
                "/airdrops/claimable/{address}?limit={limit}&skimZeroValued=true"
            ))
            .await?;
        Ok(page.items)
    }

    /// The wallet's allocation in one airdrop, or None when it has none.
    /// The endpoint signals "no allocation" both as 404 and as a null body.
    pub async fn claimant(&self, distributor: &str, address: &str) -> Result<Option<Claimant>> {
        match self
            .get::<Option<Claimant>>(&format!("/claimant/{distributor}/{address}"))
            .await
        {
            Ok(claimant) => Ok(claimant),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Registers a recipient list and gets back the merkle root plus the
    /// airdrop record the distributor should be created from.
    pub async fn create_merkle_root(
        &self,
        name: &str,
        mint: &str,
        recipients: Vec<Recipient>,
    ) -> Result<MerkleRootResponse> {
        let request = MerkleRootRequest {
            recipients,
            name: name.to_string(),
            mint: mint.to_string(),
        };
        self.post("/merkle", &request).await
    }

    /// Metadata for a mint. The endpoint answers with a map keyed by mint
    /// address; a missing entry is not-found.
    pub async fn token_metadata(&self, mint: &str) -> Result<TokenMetadata> {
        let request = TokenMetadataRequest {
            addresses: vec![mint.to_string()],
            cluster: self.cluster,
        };
        let mut entries: HashMap<String, TokenMetadata> =
            self.post("/token-meta", &request).await?;
        entries
            .remove(mint)
            .ok_or_else(|| Error::NotFound(format!("token metadata for {mint}")))
    }

    /// Spot price in USD, 0.0 when the price service has no entry.
    pub async fn token_price(&self, mint: &str) -> Result<f64> {
        let response: PriceResponse = self
            .get(&format!(
                "/price?ids={mint}&cluster={}",
                self.cluster.as_str()
            ))
            .await?;
        Ok(response.data.get(mint).map(|p| p.value).unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", Cluster::Devnet);
        assert_eq!(client.url("/airdrops/search"), "http://localhost:3000/airdrops/search");

        let client = ApiClient::new("http://localhost:3000", Cluster::Devnet);
        assert_eq!(client.url("/merkle"), "http://localhost:3000/merkle");
    }
}
