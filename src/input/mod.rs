//! Input processing module
//! Handles address validation and Solidity source resolution

pub mod address;
pub mod source;

pub use address::ContractAddress;
pub use source::SourceLoader;

/// What the user asked us to summarize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractInput {
    Address(ContractAddress),
    Source(String),
}

impl ContractInput {
    pub fn kind(&self) -> InputKind {
        match self {
            ContractInput::Address(_) => InputKind::Address,
            ContractInput::Source(_) => InputKind::Source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Address,
    Source,
}
