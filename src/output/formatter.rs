//! Output formatters for contract summaries

use crate::config::OutputFormat;
use crate::error::{Result, SummarizerError};
use crate::explorer::abi::{render_readable, AbiEntry, AbiSummary};
use crate::summarizer::ContractSummary;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting contract summaries
pub trait OutputFormatter {
    fn format_summary(&self, summary: &ContractSummary) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with colored headings
pub struct ConsoleFormatter {
    use_colors: bool,
    show_abi: bool,
}

/// Pretty or compact JSON of the whole summary
pub struct JsonFormatter {
    pretty: bool,
}

/// The model's markdown as-is
pub struct MarkdownFormatter;

/// Picks the formatter for a requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn subject(summary: &ContractSummary) -> String {
    match &summary.address {
        Some(address) => format!("Contract {}", address),
        None => "Solidity source".to_string(),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, show_abi: bool) -> Self {
        Self { use_colors, show_abi }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("{}\n", title.color(Color::Blue).bold())
        } else {
            format!("{}\n", title)
        }
    }

    fn format_line(&self, line: &str) -> String {
        if let Some(heading) = line.strip_prefix("## ") {
            return format!("\n{}", self.format_header(heading.trim()));
        }
        if let Some(item) = line.strip_prefix("- ") {
            // "name(args): description" gets the name highlighted
            return match item.split_once("): ") {
                Some((name, rest)) => format!(
                    "  • {}: {}\n",
                    self.colorize(&format!("{})", name), Color::Cyan),
                    rest
                ),
                None => format!("  • {}\n", item),
            };
        }
        if line.trim_start().starts_with("```") {
            return String::new();
        }
        format!("{}\n", line)
    }

    /// Listing used by the `abi` command.
    pub fn format_abi(&self, address: &str, abi: &[AbiEntry]) -> String {
        let stats = AbiSummary::from_entries(abi);
        let mut output = self.format_header(&format!("ABI of {}", address));
        output.push_str(&format!(
            "{} functions ({} read-only, {} payable), {} events, {} errors\n\n",
            stats.functions, stats.view_functions, stats.payable_functions, stats.events, stats.errors
        ));
        for line in render_readable(abi).lines() {
            output.push_str(&format!("  {}\n", self.colorize(line, Color::Cyan)));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_summary(&self, summary: &ContractSummary) -> Result<String> {
        let mut output = self.format_header(&subject(summary));

        if self.show_abi {
            if let Some(abi) = &summary.readable_abi {
                output.push_str(&self.format_header("\nFunctions sent to the model"));
                for line in abi.lines() {
                    output.push_str(&format!("  {}\n", line));
                }
            }
        }

        for line in summary.summary.lines() {
            output.push_str(&self.format_line(line));
        }

        let mut footer = format!(
            "\nModel: {} | Generated: {} | {}ms",
            summary.model,
            summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            summary.processing_time_ms
        );
        if let Some(usage) = summary.usage {
            footer.push_str(&format!(" | {} tokens", usage.total_tokens));
        }
        output.push_str(&self.colorize(&footer, Color::BrightBlack));
        output.push('\n');

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, summary: &ContractSummary) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(summary)
        } else {
            serde_json::to_string(summary)
        };
        json.map_err(|e| SummarizerError::OutputFormatting(format!("JSON serialization failed: {}", e)))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_summary(&self, summary: &ContractSummary) -> Result<String> {
        Ok(format!("{}\n", summary.summary))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, show_abi: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, show_abi),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter,
        }
    }

    /// Generator for `--save`: files never carry terminal color codes.
    pub fn for_file(show_abi: bool) -> Self {
        Self::with_options(false, show_abi, true)
    }

    pub fn generate(&self, summary: &ContractSummary, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_summary(summary),
            OutputFormat::Json => self.json_formatter.format_summary(summary),
            OutputFormat::Markdown => self.markdown_formatter.format_summary(summary),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors are on when the config allows them, `--no-color` is absent and
/// `NO_COLOR` is unset or empty.
pub fn colors_enabled(config_color: bool, no_color_flag: bool, no_color_env: Option<&str>) -> bool {
    config_color && !no_color_flag && no_color_env.map_or(true, str::is_empty)
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::abi::parse_abi;
    use crate::input::InputKind;
    use crate::llm::TokenUsage;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample() -> ContractSummary {
        ContractSummary {
            input_kind: InputKind::Address,
            address: Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string()),
            model: "gpt-4o-mini".to_string(),
            summary: "## Contract Summary\nAn allowlisted token.\n\n## Key Functions\n- mint(address to, uint256 amount): Mints tokens.".to_string(),
            readable_abi: Some("mint(address to, uint256 amount)".to_string()),
            abi_stats: None,
            usage: Some(TokenUsage { input_tokens: 900, output_tokens: 100, total_tokens: 1000 }),
            generated_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            processing_time_ms: 1234,
        }
    }

    #[test]
    fn test_console_plain_layout() {
        let output = ConsoleFormatter::new(false, false).format_summary(&sample()).unwrap();
        assert_eq!(
            output,
            "Contract 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed\n\
             \nContract Summary\n\
             An allowlisted token.\n\
             \n\
             \nKey Functions\n  \
             • mint(address to, uint256 amount): Mints tokens.\n\
             \nModel: gpt-4o-mini | Generated: 2026-01-02 03:04:05 UTC | 1234ms | 1000 tokens\n"
        );
    }

    #[test]
    fn test_console_can_show_abi() {
        let output = ConsoleFormatter::new(false, true).format_summary(&sample()).unwrap();
        assert!(output.contains("Functions sent to the model\n  mint(address to, uint256 amount)\n"));
    }

    #[test]
    fn test_markdown_is_raw_by_default() {
        let output = ReportGenerator::with_options(false, false, true)
            .generate(&sample(), OutputFormat::Markdown)
            .unwrap();
        assert_eq!(output, format!("{}\n", sample().summary));
    }

    #[test]
    fn test_saved_console_output_has_no_ansi_codes() {
        colored::control::set_override(true);
        let terminal = ReportGenerator::with_options(true, true, true)
            .generate(&sample(), OutputFormat::Console)
            .unwrap();
        let saved = ReportGenerator::for_file(true)
            .generate(&sample(), OutputFormat::Console)
            .unwrap();
        colored::control::unset_override();

        assert!(terminal.contains("\x1b["));
        assert!(!saved.contains("\x1b["));
        assert!(saved.contains("Functions sent to the model"));
        assert_eq!(saved, ConsoleFormatter::new(false, true).format_summary(&sample()).unwrap());
    }

    #[test]
    fn test_colors_enabled() {
        assert!(colors_enabled(true, false, None));
        assert!(colors_enabled(true, false, Some("")));
        assert!(!colors_enabled(true, false, Some("1")));
        assert!(!colors_enabled(true, true, None));
        assert!(!colors_enabled(false, false, None));
    }

    #[test]
    fn test_json_fields() {
        let output = JsonFormatter::new(false).format_summary(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["input_kind"], "address");
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["usage"]["total_tokens"], 1000);
        assert!(value.get("abi_stats").is_none());
    }

    #[test]
    fn test_abi_listing() {
        let abi = parse_abi(r#"[{"type":"function","name":"owner","inputs":[],"stateMutability":"view"},{"type":"event","name":"E","inputs":[]}]"#).unwrap();
        let output = ConsoleFormatter::new(false, false).format_abi("0xabc", &abi);
        assert_eq!(
            output,
            "ABI of 0xabc\n1 functions (1 read-only, 0 payable), 1 events, 0 errors\n\n  owner()\n"
        );
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("summary.md");
        save_report_to_file("## Contract Summary\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "## Contract Summary\n");
    }
}
