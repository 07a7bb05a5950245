//! Output formatting for the `list` and `check-config` commands.
//!
//! Suite reports have their own renderer in [`crate::conformance::report`].

use anyhow::{Context, Result};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Print data as JSON or YAML. Table output is per command.
pub fn print_structured<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(data)?),
        OutputFormat::Yaml => println!("{}", to_yaml(data)?),
        OutputFormat::Table => {
            anyhow::bail!("Table format requires custom implementation per data type")
        }
    }
    Ok(())
}

pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
}

pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// A table header followed by a separator line.
pub fn table_header(columns: &[(&str, usize)]) -> String {
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    format!("{}\n{}", header.trim_end(), "-".repeat(total_width.saturating_sub(1)))
}

/// One table row, truncating each cell to its column width.
pub fn table_row(columns: &[(&str, usize)], cells: &[&str]) -> String {
    let mut row = String::new();
    for ((_, width), cell) in columns.iter().zip(cells) {
        row.push_str(&format!("{:<width$} ", truncate(cell, *width), width = width));
    }
    row.trim_end().to_string()
}
