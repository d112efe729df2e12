//! Configuration management for the contract summarizer

use crate::error::{Result, SummarizerError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder in `network.rpc_url` replaced by the `INFURA_API_KEY` value.
pub const INFURA_KEY_PLACEHOLDER: &str = "{INFURA_API_KEY}";

pub const ETHERSCAN_API_KEY_VAR: &str = "ETHERSCAN_API_KEY";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const INFURA_API_KEY_VAR: &str = "INFURA_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub explorer_url: String,
    pub rpc_url: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Markdown,
    Json,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Sepolia testnet".to_string(),
            chain_id: 11_155_111,
            explorer_url: "https://api-sepolia.etherscan.io/api".to_string(),
            rpc_url: Some(format!("https://sepolia.infura.io/v3/{}", INFURA_KEY_PLACEHOLDER)),
            timeout_seconds: 30,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 1500,
            timeout_seconds: 60,
            system_prompt: "You are a Solidity contract analyst.".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color: true,
        }
    }
}

/// Secrets read from the environment. Never written to the config file.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub etherscan: Option<String>,
    pub openai: Option<String>,
    pub infura: Option<String>,
}

impl ApiKeys {
    /// Read keys from the process environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }

        Self {
            etherscan: non_empty_var(ETHERSCAN_API_KEY_VAR),
            openai: non_empty_var(OPENAI_API_KEY_VAR),
            infura: non_empty_var(INFURA_API_KEY_VAR),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load the config from `path`, or from the default location when `None`.
    ///
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            debug!("Reading configuration from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            info!("No configuration found, writing defaults to {}", config_path.display());
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Overwrite `path` with the defaults without reading what is there.
    pub fn reset(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save_to(path)?;
        debug!("Wrote default configuration to {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("contract-summarizer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.explorer_url.trim().is_empty() {
            return Err(SummarizerError::Configuration(
                "network.explorer_url must not be empty".to_string(),
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(SummarizerError::Configuration(
                "llm.base_url must not be empty".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(SummarizerError::Configuration("llm.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SummarizerError::Configuration(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(SummarizerError::Configuration(
                "llm.max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The RPC endpoint with the Infura key substituted.
    ///
    /// Returns `None` when no endpoint is configured, or when the endpoint
    /// needs a key that is not available.
    pub fn resolved_rpc_url(&self, keys: &ApiKeys) -> Option<String> {
        let url = self.network.rpc_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        if url.contains(INFURA_KEY_PLACEHOLDER) {
            let key = keys.infura.as_deref()?;
            return Some(url.replace(INFURA_KEY_PLACEHOLDER, key));
        }
        Some(url.to_string())
    }
}

/// Mask a secret for display, keeping only a short prefix.
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 8 => "********".to_string(),
        Some(s) => format!("{}********", s.chars().take(4).collect::<String>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_target_sepolia() {
        let config = Config::default();
        assert_eq!(config.network.chain_id, 11_155_111);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 1500);
        assert!((config.llm.temperature - 0.2).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.network.explorer_url, NetworkConfig::default().explorer_url);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o\"\n\n[output]\nformat = \"json\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 1500);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.network.chain_id, 11_155_111);
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\ntemperature = 3.5\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SummarizerError::Configuration(_)));
    }

    #[test]
    fn test_reset_repairs_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();

        let config = Config::reset(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.network.chain_id, 11_155_111);
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SummarizerError::Configuration(_)));
    }

    #[test]
    fn test_rpc_url_substitutes_infura_key() {
        let config = Config::default();
        let keys = ApiKeys {
            infura: Some("abc123".to_string()),
            ..ApiKeys::default()
        };
        assert_eq!(
            config.resolved_rpc_url(&keys).as_deref(),
            Some("https://sepolia.infura.io/v3/abc123")
        );
        assert_eq!(config.resolved_rpc_url(&ApiKeys::default()), None);
    }

    #[test]
    fn test_rpc_url_without_placeholder_used_verbatim() {
        let mut config = Config::default();
        config.network.rpc_url = Some("http://localhost:8545".to_string());
        assert_eq!(
            config.resolved_rpc_url(&ApiKeys::default()).as_deref(),
            Some("http://localhost:8545")
        );

        config.network.rpc_url = None;
        assert_eq!(config.resolved_rpc_url(&ApiKeys::default()), None);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(None), "(not set)");
        assert_eq!(mask_secret(Some("short")), "********");
        assert_eq!(mask_secret(Some("sk-abcdefghijkl")), "sk-a********");
    }
}
