//! Contract summarizer library

pub mod cli;
pub mod config;
pub mod error;
pub mod explorer;
pub mod input;
pub mod llm;
pub mod output;
pub mod summarizer;

pub use config::Config;
pub use error::{Result, SummarizerError};
pub use summarizer::{ContractSummary, Summarizer};
