//! ABI entries and their human-readable rendering

use crate::error::{Result, SummarizerError};
use serde::{Deserialize, Serialize};

pub const NO_FUNCTIONS: &str = "No functions found in ABI.";

/// One item of a contract ABI. Fields we don't use are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability", default)]
    pub state_mutability: Option<String>,
}

// Solidity ABI JSON: `type` may be omitted and then defaults to "function".
fn default_entry_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl AbiParam {
    fn render(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{} {}", self.param_type, name),
            _ => self.param_type.clone(),
        }
    }
}

impl AbiEntry {
    pub fn is_function(&self) -> bool {
        self.entry_type == "function"
    }

    /// `name(type a, type b)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.inputs.iter().map(AbiParam::render).collect();
        format!("{}({})", self.name.as_deref().unwrap_or_default(), params.join(", "))
    }
}

/// Parse the JSON text an explorer returns for an ABI.
pub fn parse_abi(json: &str) -> Result<Vec<AbiEntry>> {
    serde_json::from_str(json).map_err(|e| SummarizerError::AbiParse(e.to_string()))
}

/// One line per function, in ABI order.
pub fn render_readable(abi: &[AbiEntry]) -> String {
    let lines: Vec<String> = abi
        .iter()
        .filter(|e| e.is_function())
        .map(AbiEntry::signature)
        .collect();

    if lines.is_empty() {
        NO_FUNCTIONS.to_string()
    } else {
        lines.join("\n")
    }
}

/// Counts by entry kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiSummary {
    pub functions: usize,
    pub view_functions: usize,
    pub payable_functions: usize,
    pub events: usize,
    pub errors: usize,
    pub has_constructor: bool,
    pub has_fallback: bool,
    pub has_receive: bool,
}

impl AbiSummary {
    pub fn from_entries(abi: &[AbiEntry]) -> Self {
        let mut summary = Self::default();
        for entry in abi {
            match entry.entry_type.as_str() {
                "function" => {
                    summary.functions += 1;
                    match entry.state_mutability.as_deref() {
                        Some("view") | Some("pure") => summary.view_functions += 1,
                        Some("payable") => summary.payable_functions += 1,
                        _ => {}
                    }
                }
                "event" => summary.events += 1,
                "error" => summary.errors += 1,
                "constructor" => summary.has_constructor = true,
                "fallback" => summary.has_fallback = true,
                "receive" => summary.has_receive = true,
                _ => {}
            }
        }
        summary
    }
}
