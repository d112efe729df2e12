//! Chat completion client for OpenAI-compatible HTTP APIs

use crate::config::{LlmConfig, OPENAI_API_KEY_VAR};
use crate::error::{Result, SummarizerError};
use crate::llm::{Completion, CompletionProvider, CompletionRequest, TokenUsage};
use async_trait::async_trait;
use log::{debug, error, trace};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for `POST {base_url}/chat/completions`.
///
/// Works against OpenAI and servers that mimic its API.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ChatCompletionClient {
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Self::with_http_client(config, api_key, http)
    }

    pub fn with_http_client(config: &LlmConfig, api_key: Option<String>, http: Client) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| {
            SummarizerError::Configuration(format!("{} is not set", OPENAI_API_KEY_VAR))
        })?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Use a different model than the configured one.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "Sending chat completion request (model={}, prompt={} bytes)",
            self.model,
            request.prompt.len()
        );
        if log::log_enabled!(log::Level::Trace) {
            trace!("Request payload: {}", serde_json::to_string_pretty(&payload)?);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("LLM request failed: {}", e);
                SummarizerError::Llm(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            let message = describe_error(status, &body);
            error!("LLM request returned {}", message);
            return Err(SummarizerError::Llm(message));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::Llm(format!("failed to parse response body: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SummarizerError::Llm("empty or missing content in response".to_string()))?;

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens.unwrap_or(u.prompt_tokens + u.completion_tokens),
        });

        debug!("Received {} bytes of completion text", text.len());

        Ok(Completion {
            text,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Render an error response, preferring the provider's own message.
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope
                .error
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={}]", s),
                    other => format!(" [code={}]", other),
                })
                .unwrap_or_default();
            format!("HTTP {}{}: {}", status, code, envelope.error.message)
        }
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = ChatCompletionClient::new(&LlmConfig::default(), None).unwrap_err();
        assert!(matches!(err, SummarizerError::Configuration(_)));
        assert!(err.to_string().contains(OPENAI_API_KEY_VAR));
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = ChatCompletionClient::new(&config, Some("k".to_string())).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_model_override() {
        let client = ChatCompletionClient::new(&LlmConfig::default(), Some("k".to_string()))
            .unwrap()
            .with_model("gpt-4o");
        assert_eq!(client.model(), "gpt-4o");
    }

    #[test]
    fn test_describe_error_uses_envelope() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(
            describe_error(StatusCode::UNAUTHORIZED, body),
            "HTTP 401 Unauthorized [code=invalid_api_key]: Incorrect API key provided"
        );
    }

    #[test]
    fn test_describe_error_falls_back_to_body() {
        assert_eq!(
            describe_error(StatusCode::BAD_GATEWAY, "upstream down\n"),
            "HTTP 502 Bad Gateway: upstream down"
        );
    }

    #[test]
    fn test_request_serialization() {
        let payload = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "hi" },
            ],
            temperature: 0.2,
            max_tokens: 1500,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 1500);
    }
}
