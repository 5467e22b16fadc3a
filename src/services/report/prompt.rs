//! Prompt Composer
//!
//! Renders the analysis instructions, the run's inputs and the frozen
//! schema example into one prompt. Pure and deterministic: the same inputs
//! always produce the same bytes.

use std::fmt;

use serde_json::Value;

use super::context_loader::ContextRecord;
use super::log_digest::LogDigest;
use super::metrics::SummaryMetrics;
use crate::models::schema::ANALYSIS_RESPONSE_FORMAT;
use crate::models::TestContext;

const NO_METRICS: &str = "No aggregate \"Total\" metrics were present in the summary report.";
const NO_LOG_LINES: &str = "No WARN or ERROR lines were found in the execution logs.";
const NO_QUESTIONS: &str = "No custom questions were supplied.";

/// Fully rendered prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt(String);

impl AnalysisPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AnalysisPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compose the analysis prompt.
pub fn compose_prompt(
    metrics: &SummaryMetrics,
    digest: &LogDigest,
    test_context: &TestContext,
    records: &[ContextRecord],
) -> AnalysisPrompt {
    let summary = if metrics.is_empty() {
        NO_METRICS.to_string()
    } else {
        format!("{:#}", Value::Object(metrics.clone()))
    };

    let logs = if digest.is_empty() {
        NO_LOG_LINES.to_string()
    } else {
        digest.render()
    };

    let details = format!("{:#}", Value::Object(test_context.context.clone()));
    let context_data = format!("{:#}", records_value(records));
    let questions = render_questions(&test_context.questions);
    let feature = test_context.feature();

    let prompt = format!(
        r#"You are an expert performance-testing analyst. Interpret the load-test summary, the execution log excerpts, the test and infrastructure details and the reference scenarios below, then produce a structured analysis.

Inputs:

Summary Report ("Total" metrics):
{summary}

Test and Infrastructure Details:
{details}

Execution Log Excerpts (WARN/ERROR lines only):
{logs}

Reference Scenarios (Context Data):
{context_data}

Feature Under Test: {feature}

Objectives:
1. Identify performance bottlenecks, anomalies and inefficient resource usage.
2. Recommend infrastructure scaling (CPU cores, memory, instance count, and similar).
3. Recommend application-level optimizations (caching, connection pooling, rate limiting, and similar).
4. Propose concrete machine-spec changes for CPU, memory, disk and network.
5. If the system performs well, state that no scaling is needed and explain why.
6. Answer each of these custom evaluation questions, in order:
{questions}

Use the reference scenarios and the feature under test ("{feature}") to ground every recommendation in the system's architecture, usage pattern and expected baselines. Features such as login, search or checkout load a system differently; adjust accordingly.

Output requirements:
- Reply with JSON only. No prose before or after it.
- Keep entries short and specific; prefer numbers (response-time thresholds, CPU %, TPS) wherever they apply.
- Reasons in "recommendations" and notes in "infra_suggestions" must cite the reference scenarios or the feature under test where relevant.
- The reply must contain these top-level keys:
  - "bottlenecks": detected performance issues
  - "recommendations": scaling and optimization actions, grouped as infra, application, config and api_gateway
  - "infra_suggestions": current vs. suggested machine specs
  - "answers": one entry per custom question, in order
  - "test_validation_analysis": expected vs. actual results for each expected validation
  - "test_feature_justification": how the feature under test shaped the recommendations

Example JSON output:
{schema}
"#,
        summary = summary,
        details = details,
        logs = logs,
        context_data = context_data,
        feature = feature,
        questions = questions,
        schema = ANALYSIS_RESPONSE_FORMAT,
    );

    tracing::debug!(bytes = prompt.len(), "composed analysis prompt");
    tracing::trace!(prompt = %prompt, "analysis prompt body");

    AnalysisPrompt(prompt)
}

fn records_value(records: &[ContextRecord]) -> Value {
    Value::Array(
        records
            .iter()
            .map(|record| {
                Value::Object(
                    record
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn render_questions(questions: &[String]) -> String {
    if questions.is_empty() {
        return NO_QUESTIONS.to_string();
    }
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("   {}. {}", i + 1, q.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
