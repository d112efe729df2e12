//! Output formatting and persistence

pub mod formatter;
pub mod progress;

pub use formatter::{colors_enabled, save_report_to_file, OutputFormatter, ReportGenerator};
