//! Rendering suite reports for consoles and CI.

use owo_colors::OwoColorize;
use serde::Serialize;

use super::result::{SuiteReport, SuiteSummary};

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: SuiteSummary,
    #[serde(flatten)]
    report: &'a SuiteReport,
}

/// Render `report` in `format`. `color` only affects console output.
pub fn render(report: &SuiteReport, format: ReportFormat, color: bool) -> serde_json::Result<String> {
    match format {
        ReportFormat::Console => Ok(render_console(report, color)),
        ReportFormat::Json => render_json(report),
    }
}

/// Pretty JSON: `{ "summary": {...}, "results": [{name, passed, message, ...}] }`.
pub fn render_json(report: &SuiteReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport { summary: report.summary(), report })
}

/// One line per case followed by a summary line.
pub fn render_console(report: &SuiteReport, color: bool) -> String {
    let mut out = String::new();

    for result in report.results() {
        let verdict = match (result.is_passed(), color) {
            (true, true) => "PASS".green().bold().to_string(),
            (false, true) => "FAIL".red().bold().to_string(),
            (true, false) => "PASS".to_string(),
            (false, false) => "FAIL".to_string(),
        };

        out.push_str(&format!("{}  {}", verdict, result.name()));

        let statuses = result
            .observations()
            .iter()
            .map(|o| format!("{}={}", o.ingress, o.status))
            .collect::<Vec<_>>();
        if !statuses.is_empty() {
            out.push_str(&format!(" [{}]", statuses.join(", ")));
        }
        out.push('\n');

        if let Some(message) = result.message() {
            out.push_str(&format!("      {}\n", message));
        }
    }

    let summary = report.summary();
    out.push_str(&format!(
        "\n{} cases: {} passed, {} failed\n",
        summary.total, summary.passed, summary.failed
    ));
    out
}
