// crates/openam-contract/src/bin/openam_contract.rs
// ============================================================================
// Module: OpenAM Contract Runner
// Description: Command-line runner for the authenticate contract scenarios.
// Purpose: Run scenarios against a configured target and emit a JSON report.
// Dependencies: clap, openam-contract, serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! Runs the selected scenarios (all by default) against the target described
//! by `OPENAM_URI`, `USERNAME`, and `PASSWORD`, with CLI flags taking
//! precedence. Logs go to stderr; the canonical JSON report goes to stdout.
//! The process exits non-zero when any scenario fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::ValueEnum;
use openam_contract::AuthenticateClient;
use openam_contract::ContractError;
use openam_contract::Scenario;
use openam_contract::ScenarioReport;
use openam_contract::TargetConfig;
use openam_contract::TargetEnv;
use openam_contract::config::read_env_strict;
use openam_contract::logging::DEFAULT_LOG_LEVEL;
use openam_contract::logging::LogFormat;
use openam_contract::logging::init_logging;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "openam-contract", version, about = "Check the OpenAM /authenticate contract")]
struct Cli {
    /// Base endpoint; overrides `OPENAM_URI`.
    #[arg(long, value_name = "URI")]
    uri: Option<String>,
    /// Valid username; overrides `USERNAME`.
    #[arg(long, value_name = "USERNAME")]
    username: Option<String>,
    /// Valid password; overrides `PASSWORD`.
    #[arg(long, value_name = "PASSWORD")]
    password: Option<String>,
    /// Client timeout in seconds; overrides `OPENAM_TIMEOUT_SEC`.
    #[arg(long = "timeout-sec", value_name = "SECONDS")]
    timeout_sec: Option<u64>,
    /// Scenario to run; repeatable. Defaults to all scenarios.
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<Scenario>,
    /// Runs per scenario; repeats must match the first run.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,
    /// Writes the request/response transcript to this file.
    #[arg(long, value_name = "PATH")]
    transcript: Option<PathBuf>,
    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormatArg::Pretty)]
    log_format: LogFormatArg,
}

/// Log format flag values.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Runner failures that prevent a report from being produced.
#[derive(Debug, Error)]
enum CliError {
    /// Target configuration or client setup failed.
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// Writing output failed.
    #[error("failed to write {target}: {message}")]
    Output {
        /// Output destination.
        target: String,
        /// Underlying error text.
        message: String,
    },
}

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Canonical run report written to stdout.
#[derive(Debug, Serialize)]
struct RunReport {
    /// Authenticate endpoint URL.
    target: String,
    /// Number of passing scenarios.
    passed: usize,
    /// Number of failing scenarios.
    failed: usize,
    /// Per-scenario results in run order.
    results: Vec<ScenarioResult>,
}

/// Result of one scenario.
#[derive(Debug, Serialize)]
struct ScenarioResult {
    /// Scenario that ran.
    scenario: Scenario,
    /// `pass` or `fail`.
    outcome: &'static str,
    /// Observed outcome when passing.
    report: Option<ScenarioReport>,
    /// Failure message when failing.
    error: Option<String>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format.into(), DEFAULT_LOG_LEVEL);
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Runs the selected scenarios and writes outputs; returns true when all pass.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let config = load_config(cli)?;
    let client = AuthenticateClient::new(&config)?;
    let selected =
        if cli.scenarios.is_empty() { Scenario::ALL.to_vec() } else { cli.scenarios.clone() };

    let results: Vec<ScenarioResult> = selected
        .into_iter()
        .map(|scenario| match scenario.run_repeated(&client, &config.credentials, cli.repeat) {
            Ok(report) => ScenarioResult {
                scenario,
                outcome: "pass",
                report: Some(report),
                error: None,
            },
            Err(err) => {
                tracing::error!(scenario = scenario.as_str(), error = %err, "scenario failed");
                ScenarioResult {
                    scenario,
                    outcome: "fail",
                    report: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect();
    let failed = results.iter().filter(|result| result.error.is_some()).count();
    let report = RunReport {
        target: client.url().to_string(),
        passed: results.len() - failed,
        failed,
        results,
    };

    if let Some(path) = &cli.transcript {
        let bytes = serde_jcs::to_vec(&client.transcript()).map_err(|err| CliError::Output {
            target: path.display().to_string(),
            message: err.to_string(),
        })?;
        fs::write(path, bytes).map_err(|err| CliError::Output {
            target: path.display().to_string(),
            message: err.to_string(),
        })?;
    }
    write_report(&report)?;
    Ok(failed == 0)
}

/// Loads target configuration with CLI flags layered over the environment.
fn load_config(cli: &Cli) -> Result<TargetConfig, ContractError> {
    let timeout = cli.timeout_sec.map(|secs| secs.to_string());
    TargetConfig::from_lookup(|name| {
        let flag = TargetEnv::ALL.into_iter().find(|key| key.as_str() == name).and_then(|key| {
            match key {
                TargetEnv::OpenamUri => cli.uri.clone(),
                TargetEnv::Username => cli.username.clone(),
                TargetEnv::Password => cli.password.clone(),
                TargetEnv::TimeoutSeconds => timeout.clone(),
            }
        });
        match flag {
            Some(value) => Ok(Some(value)),
            None => read_env_strict(name),
        }
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes the canonical JSON report to stdout with a trailing newline.
fn write_report(report: &RunReport) -> Result<(), CliError> {
    let mut bytes = serde_jcs::to_vec(report).map_err(|err| CliError::Output {
        target: "stdout".to_string(),
        message: err.to_string(),
    })?;
    bytes.push(b'\n');
    std::io::stdout().write_all(&bytes).map_err(|err| CliError::Output {
        target: "stdout".to_string(),
        message: err.to_string(),
    })
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
