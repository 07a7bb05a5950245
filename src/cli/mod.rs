//! # Command Line Interface
//!
//! `run` executes the suite and exits 0 when every case passed, 1 when any
//! case failed, and 2 when the harness could not start (bad configuration,
//! missing credentials).

pub mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::config::ConformanceConfig;
use crate::conformance::{render, ConformanceCase, ConformanceSuite, ReportFormat, SuiteReport};
use crate::observability::init_logging;
use output::{print_structured, table_header, table_row, OutputFormat};

/// Every case passed.
pub const EXIT_SUCCESS: u8 = 0;
/// At least one case failed or was cancelled.
pub const EXIT_CASE_FAILURE: u8 = 1;
/// The suite could not be started.
pub const EXIT_HARNESS_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "gateway-conformance")]
#[command(about = "End-to-end conformance checks for authenticated gateway ingress paths")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file. Without it the canonical setup is read from
    /// GATEWAY_CONFORMANCE_* environment variables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every configured case and report the results
    Run {
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,

        /// Cancel cases still pending after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Disable colored console output
        #[arg(long)]
        no_color: bool,
    },

    /// List configured cases without running them
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Validate the configuration and build clients without sending requests
    CheckConfig {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

/// Parse arguments, run the command and map the outcome to an exit code.
pub async fn run_cli() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::from(EXIT_HARNESS_ERROR)
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<u8> {
    let config = ConformanceConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Run { format, deadline_secs, no_color } => {
            let report = run_suite(&config, deadline_secs.map(Duration::from_secs)).await?;
            let color = !no_color && std::io::stdout().is_terminal();
            let rendered = render(&report, format, color).context("Failed to render report")?;
            match format {
                ReportFormat::Console => print!("{}", rendered),
                ReportFormat::Json => println!("{}", rendered),
            }
            Ok(exit_code(&report))
        }
        Commands::List { output } => {
            list_cases(&config.cases(), output)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::CheckConfig { output } => {
            check_config(&config, output)?;
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Build the suite from `config` and run it.
pub async fn run_suite(
    config: &ConformanceConfig,
    deadline: Option<Duration>,
) -> anyhow::Result<SuiteReport> {
    let resolver = config.build_resolver().context("Failed to build secret resolver")?;
    let suite = ConformanceSuite::from_config(config, resolver)
        .context("Failed to build conformance suite")?;

    Ok(match deadline {
        Some(budget) => suite.run_all_with_deadline(budget).await,
        None => suite.run_all().await,
    })
}

pub fn exit_code(report: &SuiteReport) -> u8 {
    if report.all_passed() {
        EXIT_SUCCESS
    } else {
        EXIT_CASE_FAILURE
    }
}

#[derive(Debug, Serialize)]
struct CaseRow<'a> {
    name: &'a str,
    secret: Option<&'a str>,
    ingresses: &'a [String],
    expected_status: u16,
}

impl<'a> From<&'a ConformanceCase> for CaseRow<'a> {
    fn from(case: &'a ConformanceCase) -> Self {
        Self {
            name: case.name(),
            secret: case.secret().map(|s| s.as_str()),
            ingresses: case.ingresses(),
            expected_status: case.expected_status(),
        }
    }
}

const CASE_COLUMNS: [(&str, usize); 4] =
    [("NAME", 48), ("SECRET", 32), ("INGRESSES", 40), ("EXPECT", 6)];

fn list_cases(cases: &[ConformanceCase], output: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<CaseRow<'_>> = cases.iter().map(CaseRow::from).collect();

    if output != OutputFormat::Table {
        return print_structured(&rows, output);
    }

    if rows.is_empty() {
        println!("No cases configured");
        return Ok(());
    }

    println!("{}", table_header(&CASE_COLUMNS));
    for row in &rows {
        let ingresses = row.ingresses.join(" -> ");
        let status = row.expected_status.to_string();
        println!(
            "{}",
            table_row(&CASE_COLUMNS, &[row.name, row.secret.unwrap_or("-"), &ingresses, &status])
        );
    }
    println!("\nTotal: {} case(s)", rows.len());
    Ok(())
}

fn check_config(config: &ConformanceConfig, output: OutputFormat) -> anyhow::Result<()> {
    let ingresses = config.build_ingresses().context("Invalid ingress configuration")?;
    let resolver = config.build_resolver().context("Invalid secret store configuration")?;

    if output != OutputFormat::Table {
        return print_structured(config, output);
    }

    println!("Configuration OK");
    for client in ingresses.clients() {
        println!("  ingress  {:<24} {}", client.name(), client.endpoint().base_url());
    }
    println!("  secrets  {}", resolver.backend());
    println!("  cases    {}", config.cases().len());
    Ok(())
}
