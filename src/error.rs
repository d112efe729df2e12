//! Error handling for the contract summarizer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Usage(String),

    #[error("Invalid Ethereum address. {0}")]
    InvalidAddress(String),

    #[error("Failed to fetch ABI from Etherscan. {0}")]
    Explorer(String),

    #[error("Contract ABI not available (source code not verified).")]
    AbiUnavailable,

    #[error("Failed to parse ABI: {0}")]
    AbiParse(String),

    #[error("Failed to connect to {network}. {details}")]
    Node { network: String, details: String },

    #[error("Failed to generate summary. Details: {0}")]
    Llm(String),

    #[error("Generated output does not follow the required format.")]
    InvalidFormat,

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SummarizerError>;

/// Convert TOML parse errors to our custom error type
impl From<toml::de::Error> for SummarizerError {
    fn from(err: toml::de::Error) -> Self {
        SummarizerError::Configuration(format!("Failed to parse config: {}", err))
    }
}

/// Convert TOML serialization errors to our custom error type
impl From<toml::ser::Error> for SummarizerError {
    fn from(err: toml::ser::Error) -> Self {
        SummarizerError::Configuration(format!("Failed to serialize config: {}", err))
    }
}
