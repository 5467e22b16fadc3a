//! Report Parser
//!
//! Pipeline entry point. Runs the stages in a fixed order:
//! metrics, log digest, context records, prompt, model call, reconcile.
//! Any failure before the model reply stops the run; once a reply exists
//! the run always produces an `AnalysisOutcome`.

use std::path::PathBuf;
use std::sync::Arc;

use perf_analyzer_llm::{create_provider, LlmProvider, RetryPolicy};

use super::context_loader::{read_context, ContextRecord};
use super::invoker::AnalysisInvoker;
use super::log_digest::{build_log_digest, DigestOptions, LogDigest};
use super::metrics::{extract_metrics, SummaryMetrics};
use super::prompt::{compose_prompt, AnalysisPrompt};
use super::reconciler::reconcile;
use crate::config::AnalyzerConfig;
use crate::models::{AnalysisOutcome, SchemaValidation, TestContext};
use crate::utils::error::AppResult;

/// Inputs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub test_context: TestContext,
    pub summary_path: PathBuf,
    pub log_paths: Vec<PathBuf>,
    pub context_path: PathBuf,
}

/// Tunables shared by every run of a `ReportParser`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOptions {
    pub digest: DigestOptions,
    pub retry: RetryPolicy,
    pub schema_validation: SchemaValidation,
}

/// Everything gathered before the model call.
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub metrics: SummaryMetrics,
    pub digest: LogDigest,
    pub records: Vec<ContextRecord>,
    pub prompt: AnalysisPrompt,
}

/// Stateless analysis pipeline. Safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct ReportParser {
    invoker: AnalysisInvoker,
    options: AnalysisOptions,
}

impl ReportParser {
    pub fn new(provider: Arc<dyn LlmProvider>, options: AnalysisOptions) -> Self {
        Self {
            invoker: AnalysisInvoker::new(provider, options.retry.clone()),
            options,
        }
    }

    /// Build the provider from a validated config.
    ///
    /// Fails with `AppError::Config` when the API key or model is missing.
    pub fn from_config(config: &AnalyzerConfig) -> AppResult<Self> {
        let provider_config = config.provider_config()?;
        let provider = create_provider(provider_config)?;
        tracing::debug!(
            provider = provider.name(),
            model = provider.model(),
            "report parser configured"
        );
        Ok(Self::new(provider, config.analysis_options()))
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Run the local stages: validate, extract, digest, load context, compose.
    pub fn prepare(&self, request: &AnalysisRequest) -> AppResult<PreparedAnalysis> {
        request.test_context.validate()?;

        tracing::info!(
            stage = "extract_metrics",
            path = %request.summary_path.display(),
            "reading summary"
        );
        let metrics = extract_metrics(&request.summary_path)?;

        tracing::info!(
            stage = "log_digest",
            files = request.log_paths.len(),
            "filtering execution logs"
        );
        let digest = build_log_digest(&request.log_paths, &self.options.digest)?;

        tracing::info!(
            stage = "read_context",
            path = %request.context_path.display(),
            "loading context records"
        );
        let records = read_context(&request.context_path)?;

        tracing::info!(
            stage = "compose_prompt",
            metrics = metrics.len(),
            log_lines = digest.line_count(),
            records = records.len(),
            "composing prompt"
        );
        let prompt = compose_prompt(&metrics, &digest, &request.test_context, &records);

        Ok(PreparedAnalysis {
            metrics,
            digest,
            records,
            prompt,
        })
    }

    /// Run the whole pipeline for `request`.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AppResult<AnalysisOutcome> {
        let prepared = self.prepare(request)?;

        tracing::info!(stage = "invoke", "calling model");
        let raw = self.invoker.invoke(&prepared.prompt).await?;

        let recommendation = reconcile(&raw, self.options.schema_validation);
        tracing::info!(
            stage = "reconcile",
            parsed = recommendation.is_parsed(),
            "analysis complete"
        );

        Ok(AnalysisOutcome { recommendation })
    }
}
