//! Etherscan-compatible explorer client for ABI lookup

use crate::error::{Result, SummarizerError};
use crate::explorer::abi::{parse_abi, AbiEntry};
use crate::input::ContractAddress;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const UNVERIFIED_RESULT: &str = "Contract source code not verified";

/// Anything that can produce the ABI of a deployed contract.
#[async_trait]
pub trait AbiSource: Send + Sync {
    async fn fetch_abi(&self, address: &ContractAddress) -> Result<Vec<AbiEntry>>;
}

/// Envelope shared by every Etherscan API response.
#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

impl EtherscanResponse {
    fn result_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl EtherscanClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http_client(base_url, api_key, http)
    }

    pub fn with_http_client(base_url: &str, api_key: Option<String>, http: Client) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            SummarizerError::Configuration(format!("Invalid explorer URL '{}': {}", base_url, e))
        })?;

        Ok(Self { http, base_url, api_key })
    }

    fn getabi_url(&self, address: &ContractAddress) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("module", "contract")
                .append_pair("action", "getabi")
                .append_pair("address", &address.to_lower_hex());
            if let Some(key) = &self.api_key {
                query.append_pair("apikey", key);
            }
        }
        url
    }
}

#[async_trait]
impl AbiSource for EtherscanClient {
    async fn fetch_abi(&self, address: &ContractAddress) -> Result<Vec<AbiEntry>> {
        debug!("Fetching ABI for {} from {}", address, self.base_url);
        if self.api_key.is_none() {
            warn!("ETHERSCAN_API_KEY is not set, explorer requests may be rate limited or rejected");
        }

        let response = self
            .http
            .get(self.getabi_url(address))
            .send()
            .await
            .map_err(|e| SummarizerError::Explorer(format!("Details: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizerError::Explorer(format!("HTTP {}", status)));
        }

        let envelope: EtherscanResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::Explorer(format!("Unexpected response body: {}", e)))?;

        let result = envelope.result_text();
        if result.trim() == UNVERIFIED_RESULT {
            return Err(SummarizerError::AbiUnavailable);
        }
        if envelope.status != "1" {
            return Err(SummarizerError::Explorer(format!(
                "{}: {}",
                envelope.message, result
            )));
        }

        let abi = parse_abi(&result)?;
        debug!("Explorer returned {} ABI entries", abi.len());
        Ok(abi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getabi_url_contains_query() {
        let client = EtherscanClient::with_http_client(
            "https://api-sepolia.etherscan.io/api",
            Some("KEY".to_string()),
            Client::new(),
        )
        .unwrap();
        let address = ContractAddress::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();

        let url = client.getabi_url(&address);
        assert_eq!(url.path(), "/api");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("module".into(), "contract".into())));
        assert!(pairs.contains(&("action".into(), "getabi".into())));
        assert!(pairs.contains(&("address".into(), "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".into())));
        assert!(pairs.contains(&("apikey".into(), "KEY".into())));
    }

    #[test]
    fn test_apikey_omitted_when_absent() {
        let client =
            EtherscanClient::with_http_client("https://example.org/api", None, Client::new()).unwrap();
        let address = ContractAddress::parse("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359").unwrap();
        assert!(!client.getabi_url(&address).as_str().contains("apikey"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = EtherscanClient::with_http_client("not a url", None, Client::new()).unwrap_err();
        assert!(matches!(err, SummarizerError::Configuration(_)));
    }
}
