//! Resolution of the `--code` argument into Solidity source text

use crate::error::{Result, SummarizerError};
use log::{debug, info};
use std::path::Path;
use tokio::fs;

/// Turns a `--code` value into source text.
///
/// The value is treated as a file path when such a file exists, otherwise as
/// inline Solidity.
#[derive(Debug, Default)]
pub struct SourceLoader {
    max_bytes: Option<u64>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse source files larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub async fn load(&self, code: &str) -> Result<String> {
        let source = if Self::is_file(code).await {
            let path = Path::new(code);
            info!("Reading Solidity source from {}", path.display());
            self.read_file(path).await?
        } else {
            debug!("Treating --code value as inline source ({} bytes)", code.len());
            code.to_string()
        };

        if source.trim().is_empty() {
            return Err(SummarizerError::InvalidInput("Solidity source is empty".to_string()));
        }

        Ok(source)
    }

    async fn is_file(candidate: &str) -> bool {
        // Inline source with newlines is never a path.
        if candidate.is_empty() || candidate.contains('\n') {
            return false;
        }
        fs::metadata(candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        if let Some(limit) = self.max_bytes {
            let len = fs::metadata(path).await?.len();
            if len > limit {
                return Err(SummarizerError::InvalidInput(format!(
                    "Source file {} is {} bytes, limit is {}",
                    path.display(),
                    len,
                    limit
                )));
            }
        }

        let bytes = fs::read(path).await?;
        String::from_utf8(bytes).map_err(|_| {
            SummarizerError::InvalidInput(format!("Source file {} is not valid UTF-8", path.display()))
        })
    }
}
