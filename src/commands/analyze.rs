//! Batch Analysis Command
//!
//! `perf-analyzer analyze`: reads the run's artifacts from disk, runs the
//! pipeline once and writes the result as pretty-printed JSON.

use std::path::{Path, PathBuf};

use clap::Args;
use perf_analyzer_core::{CoreError, InputKind};

use crate::config::{AnalyzerConfig, PathSettings};
use crate::models::{AnalysisResult, TestContext};
use crate::services::report::{AnalysisRequest, ReportParser};
use crate::utils::error::AppResult;
use crate::utils::paths::{ensure_parent_dir, find_log_files};

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeArgs {
    /// Directory searched for inputs and `*.log` files [default: inputs]
    #[arg(long, value_name = "DIR")]
    pub inputs_dir: Option<PathBuf>,

    /// Summary statistics document [default: <inputs-dir>/statistics.json]
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Test configuration [default: <inputs-dir>/test_config.json]
    #[arg(long, value_name = "FILE")]
    pub test_config: Option<PathBuf>,

    /// Execution logs; when omitted every `*.log` in the inputs dir is used
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub logs: Vec<PathBuf>,

    /// Reference scenarios dataset [default: data/performance_test_scenarios.csv]
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Where to write the analysis [default: outputs/analysis_recommendations.json]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overrides `test_feature` from the test configuration
    #[arg(long, value_name = "NAME")]
    pub test_feature: Option<String>,
}

/// A fully resolved batch run
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub request: AnalysisRequest,
    pub output: PathBuf,
}

impl AnalyzeArgs {
    /// Resolve paths against `config` and run the up-front input checks.
    pub fn resolve(&self, config: &AnalyzerConfig) -> AppResult<BatchRun> {
        let paths = PathSettings {
            inputs_dir: self
                .inputs_dir
                .clone()
                .unwrap_or_else(|| config.paths.inputs_dir.clone()),
            ..config.paths.clone()
        };
        let inputs_dir = &paths.inputs_dir;
        let summary_path = self.summary.clone().unwrap_or_else(|| paths.summary_file());
        let test_config_path = self
            .test_config
            .clone()
            .unwrap_or_else(|| paths.test_config_file());
        let context_path = self
            .context
            .clone()
            .unwrap_or_else(|| paths.context_file.clone());
        let output = self.output.clone().unwrap_or_else(|| paths.output_file());

        if !summary_path.exists() {
            return Err(CoreError::not_found(InputKind::SummaryFile, summary_path).into());
        }

        let mut test_context = TestContext::load(&test_config_path)?;

        let log_paths = if self.logs.is_empty() {
            find_log_files(inputs_dir)?
        } else {
            self.logs.clone()
        };
        if log_paths.is_empty() {
            return Err(CoreError::validation(format!(
                "No .log files found in {}",
                inputs_dir.display()
            ))
            .into());
        }

        if let Some(feature) = &self.test_feature {
            test_context = test_context.with_feature(feature.clone());
        }
        test_context.validate()?;

        Ok(BatchRun {
            request: AnalysisRequest {
                test_context,
                summary_path,
                log_paths,
                context_path,
            },
            output,
        })
    }
}

/// Analyze and write the result to `run.output`.
pub async fn execute(parser: &ReportParser, run: &BatchRun) -> AppResult<AnalysisResult> {
    tracing::info!(
        summary = %run.request.summary_path.display(),
        logs = run.request.log_paths.len(),
        feature = run.request.test_context.feature(),
        "starting report analysis"
    );

    let outcome = parser.analyze(&run.request).await?;
    write_result(&run.output, &outcome.recommendation)?;

    if outcome.recommendation.is_parsed() {
        tracing::info!(output = %run.output.display(), "saved analysis");
    } else {
        tracing::warn!(
            output = %run.output.display(),
            "model reply could not be parsed; saved the raw reply envelope"
        );
    }
    Ok(outcome.recommendation)
}

/// Resolve, build the parser from `config`, and execute.
pub async fn run(args: &AnalyzeArgs, config: &AnalyzerConfig) -> AppResult<PathBuf> {
    let batch = args.resolve(config)?;
    let parser = ReportParser::from_config(config)?;
    execute(&parser, &batch).await?;
    Ok(batch.output)
}

fn write_result(path: &Path, result: &AnalysisResult) -> AppResult<()> {
    ensure_parent_dir(path)?;
    let body = serde_json::to_string_pretty(result)?;
    std::fs::write(path, body)?;
    Ok(())
}
