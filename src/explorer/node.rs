//! JSON-RPC reachability probe for the configured network

use crate::error::{Result, SummarizerError};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Checks that a node answers `eth_chainId` before we do any real work.
#[derive(Debug, Clone)]
pub struct RpcProbe {
    http: Client,
    url: String,
    network: String,
    expected_chain_id: u64,
}

impl RpcProbe {
    pub fn new(url: String, network: String, expected_chain_id: u64, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url, network, expected_chain_id })
    }

    fn unreachable(&self, details: impl Into<String>) -> SummarizerError {
        SummarizerError::Node {
            network: self.network.clone(),
            details: details.into(),
        }
    }

    /// Returns the chain id reported by the node.
    ///
    /// A chain id different from the configured one is logged, not rejected.
    pub async fn probe(&self) -> Result<u64> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_chainId",
            params: Vec::new(),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unreachable(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(self.unreachable(format!("HTTP {}", response.status())));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| self.unreachable(format!("Malformed JSON-RPC response: {}", e)))?;

        if let Some(err) = body.error {
            return Err(self.unreachable(format!("RPC error {}: {}", err.code, err.message)));
        }

        let raw = body
            .result
            .ok_or_else(|| self.unreachable("JSON-RPC response has no result"))?;
        let chain_id = parse_quantity(&raw)
            .ok_or_else(|| self.unreachable(format!("Invalid chain id '{}'", raw)))?;

        if chain_id != self.expected_chain_id {
            warn!(
                "Node reports chain id {} but {} is configured as {}",
                chain_id, self.network, self.expected_chain_id
            );
        } else {
            debug!("Connected to {} (chain id {})", self.network, chain_id);
        }

        Ok(chain_id)
    }
}

/// Parse a JSON-RPC hex quantity such as `0xaa36a7`.
fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
