// Perf Analyzer - command-line entry point

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use perf_analyzer::commands::{analyze, serve, AnalyzeArgs, ServeArgs};
use perf_analyzer::config::AnalyzerConfig;
use perf_analyzer::utils::paths::ensure_parent_dir;

const DEFAULT_LOG_FILTER: &str = "perf_analyzer=info,perf_analyzer_llm=info";

#[derive(Debug, Parser)]
#[command(name = "perf-analyzer", version, about = "LLM-assisted load-test analysis")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Also append logs to this file (e.g. outputs/run.log)
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze one test run from files on disk
    Analyze(AnalyzeArgs),
    /// Serve the analysis endpoint over HTTP
    Serve(ServeArgs),
}

fn init_tracing(log_json: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = match log_file {
        Some(path) => {
            ensure_parent_dir(path)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let json_layer = log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .context("cannot install tracing subscriber")?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config =
        AnalyzerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Analyze(args) => {
            let output = analyze::run(&args, &config)
                .await
                .context("Failed to analyze report")?;
            tracing::info!(output = %output.display(), "done");
        }
        Command::Serve(args) => {
            serve::run(&args, &config)
                .await
                .context("HTTP server failed")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_json, cli.log_file.as_deref()) {
        eprintln!("perf-analyzer: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "run failed");
            ExitCode::FAILURE
        }
    }
}
