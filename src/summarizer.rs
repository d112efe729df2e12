//! The summary pipeline: resolve input, build the prompt, ask the model

use crate::config::{ApiKeys, Config};
use crate::error::{Result, SummarizerError};
use crate::explorer::abi::{render_readable, AbiEntry, AbiSummary};
use crate::explorer::{AbiSource, EtherscanClient, RpcProbe};
use crate::input::{ContractAddress, ContractInput, InputKind};
use crate::llm::prompts::{follows_summary_format, PromptParams, PromptTemplates};
use crate::llm::{ChatCompletionClient, CompletionProvider, CompletionRequest, TokenUsage};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Result of summarizing one contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSummary {
    pub input_kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub model: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readable_abi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi_stats: Option<AbiSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

pub struct Summarizer {
    abi_source: Box<dyn AbiSource>,
    provider: Box<dyn CompletionProvider>,
    probe: Option<RpcProbe>,
    templates: PromptTemplates,
    system_prompt: String,
}

impl Summarizer {
    pub fn new(
        abi_source: Box<dyn AbiSource>,
        provider: Box<dyn CompletionProvider>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            abi_source,
            provider,
            probe: None,
            templates: PromptTemplates::default(),
            system_prompt: system_prompt.into(),
        }
    }

    /// Wire up the explorer, model client and optional node probe from config.
    pub fn from_config(config: &Config, keys: &ApiKeys, model_override: Option<String>) -> Result<Self> {
        let (explorer, probe) = chain_access_from_config(config, keys)?;

        let mut client = ChatCompletionClient::new(&config.llm, keys.openai.clone())?;
        if let Some(model) = model_override {
            client = client.with_model(model);
        }

        let mut summarizer = Self::new(Box::new(explorer), Box::new(client), config.llm.system_prompt.clone());
        if let Some(probe) = probe {
            summarizer = summarizer.with_probe(probe);
        }
        Ok(summarizer)
    }

    /// Check node reachability before every ABI lookup.
    pub fn with_probe(mut self, probe: RpcProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Fetch the ABI of a deployed contract.
    pub async fn lookup_abi(&self, address: &ContractAddress) -> Result<Vec<AbiEntry>> {
        lookup_abi(self.abi_source.as_ref(), self.probe.as_ref(), address).await
    }

    pub async fn summarize(&self, input: ContractInput) -> Result<ContractSummary> {
        let start = Instant::now();
        let input_kind = input.kind();

        let (contract_input, address, readable_abi, abi_stats) = match input {
            ContractInput::Address(address) => {
                let abi = self.lookup_abi(&address).await?;
                let readable = render_readable(&abi);
                (
                    readable.clone(),
                    Some(address.to_string()),
                    Some(readable),
                    Some(AbiSummary::from_entries(&abi)),
                )
            }
            ContractInput::Source(source) => {
                if source.trim().is_empty() {
                    return Err(SummarizerError::InvalidInput("Solidity source is empty".to_string()));
                }
                (source, None, None, None)
            }
        };

        let prompt = self
            .templates
            .render_contract_summary(&PromptParams { contract_input });
        let request = CompletionRequest {
            system: self.system_prompt.clone(),
            prompt,
        };

        info!("Requesting summary from {}", self.provider.model());
        let completion = self.provider.complete(&request).await?;

        if !follows_summary_format(&completion.text) {
            warn!("Model output is missing the summary heading");
            debug!("Rejected output: {}", completion.text);
            return Err(SummarizerError::InvalidFormat);
        }

        Ok(ContractSummary {
            input_kind,
            address,
            model: completion.model,
            summary: completion.text,
            readable_abi,
            abi_stats,
            usage: completion.usage,
            generated_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Explorer client and, when an RPC endpoint is configured, a node probe.
pub fn chain_access_from_config(config: &Config, keys: &ApiKeys) -> Result<(EtherscanClient, Option<RpcProbe>)> {
    let timeout = Duration::from_secs(config.network.timeout_seconds);
    let explorer = EtherscanClient::new(&config.network.explorer_url, keys.etherscan.clone(), timeout)?;

    let probe = match config.resolved_rpc_url(keys) {
        Some(url) => Some(RpcProbe::new(
            url,
            config.network.name.clone(),
            config.network.chain_id,
            timeout,
        )?),
        None => None,
    };
    Ok((explorer, probe))
}

/// Check the node (if any), then fetch the ABI.
pub async fn lookup_abi(
    abi_source: &dyn AbiSource,
    probe: Option<&RpcProbe>,
    address: &ContractAddress,
) -> Result<Vec<AbiEntry>> {
    match probe {
        Some(probe) => {
            probe.probe().await?;
        }
        None => debug!("No RPC endpoint configured, skipping node check"),
    }

    let abi = abi_source.fetch_abi(address).await?;
    let stats = AbiSummary::from_entries(&abi);
    info!(
        "Fetched ABI for {}: {} functions, {} events, {} errors",
        address, stats.functions, stats.events, stats.errors
    );
    Ok(abi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::abi::parse_abi;
    use crate::llm::Completion;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    struct FixedAbi(Result<Vec<AbiEntry>>);

    #[async_trait]
    impl AbiSource for FixedAbi {
        async fn fetch_abi(&self, _address: &ContractAddress) -> Result<Vec<AbiEntry>> {
            match &self.0 {
                Ok(abi) => Ok(abi.clone()),
                Err(_) => Err(SummarizerError::AbiUnavailable),
            }
        }
    }

    /// Records prompts and answers with a fixed reply.
    struct ScriptedModel {
        reply: String,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    #[async_trait]
    impl CompletionProvider for ScriptedModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(Completion {
                text: self.reply.clone(),
                model: "scripted".to_string(),
                usage: None,
            })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn summarizer(abi: Result<Vec<AbiEntry>>, reply: &str) -> (Summarizer, Arc<Mutex<Vec<CompletionRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let model = ScriptedModel {
            reply: reply.to_string(),
            seen: Arc::clone(&seen),
        };
        let s = Summarizer::new(Box::new(FixedAbi(abi)), Box::new(model), "You are a Solidity contract analyst.");
        (s, seen)
    }

    fn sample_abi() -> Vec<AbiEntry> {
        parse_abi(r#"[{"type":"function","name":"mint","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}]}]"#)
            .unwrap()
    }

    #[tokio::test]
    async fn test_address_input_sends_readable_abi() {
        let (s, seen) = summarizer(Ok(sample_abi()), "## Contract Summary\nMints tokens.");
        let address = ContractAddress::parse(ADDRESS).unwrap();

        let summary = s.summarize(ContractInput::Address(address)).await.unwrap();
        assert_eq!(summary.input_kind, InputKind::Address);
        assert_eq!(summary.address.as_deref(), Some(ADDRESS));
        assert_eq!(summary.readable_abi.as_deref(), Some("mint(address to, uint256 amount)"));
        assert_eq!(summary.abi_stats.as_ref().map(|s| s.functions), Some(1));

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, "You are a Solidity contract analyst.");
        assert!(requests[0].prompt.contains("mint(address to, uint256 amount)"));
    }

    #[tokio::test]
    async fn test_source_input_forwarded_unchanged() {
        let (s, seen) = summarizer(Ok(vec![]), "## Contract Summary\nA counter.");
        let source = "contract Counter { uint256 public n; }".to_string();

        let summary = s.summarize(ContractInput::Source(source.clone())).await.unwrap();
        assert_eq!(summary.input_kind, InputKind::Source);
        assert!(summary.address.is_none());
        assert!(summary.readable_abi.is_none());
        assert!(seen.lock().unwrap()[0].prompt.contains(&source));
    }

    #[tokio::test]
    async fn test_output_without_heading_rejected() {
        let (s, _) = summarizer(Ok(vec![]), "Sorry, I can't do that.");
        let err = s
            .summarize(ContractInput::Source("contract A {}".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidFormat));
        assert_eq!(err.to_string(), "Generated output does not follow the required format.");
    }

    #[tokio::test]
    async fn test_explorer_error_stops_pipeline() {
        let (s, seen) = summarizer(Err(SummarizerError::AbiUnavailable), "## Contract Summary\n");
        let address = ContractAddress::parse(ADDRESS).unwrap();

        let err = s.summarize(ContractInput::Address(address)).await.unwrap_err();
        assert!(matches!(err, SummarizerError::AbiUnavailable));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_abi_still_summarized() {
        let (s, seen) = summarizer(Ok(vec![]), "## Contract Summary\nNothing callable.");
        let address = ContractAddress::parse(ADDRESS).unwrap();

        let summary = s.summarize(ContractInput::Address(address)).await.unwrap();
        assert_eq!(summary.readable_abi.as_deref(), Some("No functions found in ABI."));
        assert!(seen.lock().unwrap()[0].prompt.contains("No functions found in ABI."));
    }

    #[tokio::test]
    async fn test_blank_source_rejected() {
        let (s, seen) = summarizer(Ok(vec![]), "## Contract Summary\n");
        let err = s.summarize(ContractInput::Source("   ".to_string())).await.unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidInput(_)));
        assert!(seen.lock().unwrap().is_empty());
    }
}
