//! Ethereum address parsing with EIP-55 checksum validation

use crate::error::{Result, SummarizerError};
use alloy_primitives::Address;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(0[xX])?[0-9a-fA-F]{40}$").expect("static regex"))
}

/// A validated 20-byte contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractAddress(Address);

impl ContractAddress {
    /// Parse a hex address, with or without the `0x` prefix.
    ///
    /// Single-case input is accepted as-is. Mixed-case input must carry a
    /// valid EIP-55 checksum.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SummarizerError::InvalidAddress("Address is empty.".to_string()));
        }
        if !address_pattern().is_match(trimmed) {
            return Err(SummarizerError::InvalidAddress(format!(
                "Expected 40 hex characters with an optional 0x prefix, got '{}'.",
                trimmed
            )));
        }

        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let prefixed = format!("0x{}", body);

        let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
        let address = if has_lower && has_upper {
            Address::parse_checksummed(&prefixed, None).map_err(|e| {
                SummarizerError::InvalidAddress(format!("Checksum mismatch for '{}': {}.", trimmed, e))
            })?
        } else {
            prefixed
                .parse::<Address>()
                .map_err(|e| SummarizerError::InvalidAddress(e.to_string()))?
        };

        Ok(Self(address))
    }

    /// Lowercase `0x`-prefixed form.
    pub fn to_lower_hex(&self) -> String {
        self.to_checksum().to_ascii_lowercase()
    }

    /// EIP-55 mixed-case form.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl FromStr for ContractAddress {
    type Err = SummarizerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}
