//! `cat-search`: run catalogue search requests through the mapper and
//! validator from the command line.
//!
//! Parameters are given as `key=value` arguments, split at the first `=`:
//!
//! ```text
//! cat-search validate geometry=Point 'coordinates=[77.1,28.2]' maxDistance=500
//! ```

#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use catalogue_search_core::{MappingError, QueryEngine, QueryLimits, Verdict};

/// Exit code for a request that mapped but failed validation
pub const EXIT_INVALID: i32 = 1;
/// Exit code for a request whose parameters did not map
pub const EXIT_MAPPING: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("exit code {0}")]
    ExitCode(i32),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(
    name = "cat-search",
    version,
    about = "Map and validate catalogue search parameters"
)]
pub struct Cli {
    /// Log at info level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the structured query handed to the index query builder
    Map(ParamArgs),
    /// Map, classify, and validate; print the verdict
    Validate(ParamArgs),
    /// Print the effective validation limits
    Limits,
}

#[derive(Args, Debug)]
pub struct ParamArgs {
    /// Request parameters as key=value
    #[arg(value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

/// Split a `key=value` argument at the first `=`.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing key in '{raw}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

pub fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let stdout = std::io::stdout();
    match execute(&cli, &mut stdout.lock()) {
        Ok(()) => 0,
        Err(CliError::ExitCode(code)) => code,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a parsed command, writing its JSON output to `out`.
pub fn execute(cli: &Cli, out: &mut impl Write) -> CliResult<()> {
    // the only place the limits are taken from the environment
    let engine = QueryEngine::new(QueryLimits::from_env());
    tracing::info!(limits = ?engine.limits(), "limits resolved");
    match &cli.command {
        Commands::Map(args) => handle_map(&engine, args, cli.pretty, out),
        Commands::Validate(args) => handle_validate(&engine, args, cli.pretty, out),
        Commands::Limits => emit(out, &limits_json(engine.limits())?, cli.pretty),
    }
}

fn handle_map(
    engine: &QueryEngine,
    args: &ParamArgs,
    pretty: bool,
    out: &mut impl Write,
) -> CliResult<()> {
    match engine.map(args.params.iter().map(|(k, v)| (k, v))) {
        Ok(query) => emit(out, &query.to_json(), pretty),
        Err(err) => mapping_failed(&err, pretty, out),
    }
}

fn handle_validate(
    engine: &QueryEngine,
    args: &ParamArgs,
    pretty: bool,
    out: &mut impl Write,
) -> CliResult<()> {
    let query = match engine.map(args.params.iter().map(|(k, v)| (k, v))) {
        Ok(query) => query,
        Err(err) => return mapping_failed(&err, pretty, out),
    };
    let verdict = engine.check(&query);
    emit(out, &verdict.to_json(), pretty)?;
    match verdict {
        Verdict::Success => Ok(()),
        Verdict::Failure(_) => Err(CliError::ExitCode(EXIT_INVALID)),
    }
}

fn mapping_failed(err: &MappingError, pretty: bool, out: &mut impl Write) -> CliResult<()> {
    tracing::info!(key = err.key(), error_type = err.error_type(), "mapping failed");
    let body = serde_json::to_value(err.to_failure().to_response())?;
    emit(out, &body, pretty)?;
    Err(CliError::ExitCode(EXIT_MAPPING))
}

fn limits_json(limits: &QueryLimits) -> CliResult<serde_json::Value> {
    Ok(serde_json::to_value(limits)?)
}

fn emit(out: &mut impl Write, value: &serde_json::Value, pretty: bool) -> CliResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
