//! Metrics Extractor
//!
//! Pulls the aggregate `"Total"` block out of a summary-statistics document.

use std::path::Path;

use perf_analyzer_core::{CoreError, CoreResult, InputKind};
use serde_json::Value;

/// Key of the aggregate section in the summary document
pub const TOTAL_KEY: &str = "Total";

/// Aggregate metric name to value. Empty means "no aggregate data".
pub type SummaryMetrics = serde_json::Map<String, Value>;

/// Read `path` and return its `"Total"` section.
///
/// A document without `"Total"` yields an empty mapping. Either the whole
/// block is returned or an error is raised.
pub fn extract_metrics(path: &Path) -> CoreResult<SummaryMetrics> {
    if !path.exists() {
        return Err(CoreError::not_found(InputKind::SummaryFile, path));
    }

    let raw = std::fs::read_to_string(path).map_err(|e| {
        CoreError::unexpected(format!(
            "Unexpected error while reading summary file {}: {}",
            path.display(),
            e
        ))
    })?;

    let document: Value = serde_json::from_str(&raw).map_err(|e| {
        CoreError::format(format!(
            "Invalid JSON in summary file {}: {}",
            path.display(),
            e
        ))
    })?;

    let metrics = total_section(document).map_err(|msg| {
        CoreError::format(format!("{} in summary file {}", msg, path.display()))
    })?;

    tracing::debug!(
        path = %path.display(),
        metric_count = metrics.len(),
        "extracted summary metrics"
    );
    Ok(metrics)
}

fn total_section(document: Value) -> Result<SummaryMetrics, String> {
    let Value::Object(mut top) = document else {
        return Err("Expected a JSON object at the top level".to_string());
    };
    match top.remove(TOTAL_KEY) {
        None => Ok(SummaryMetrics::new()),
        Some(Value::Object(total)) => Ok(total),
        Some(other) => Err(format!(
            "Expected \"{}\" to be an object, found {}",
            TOTAL_KEY,
            json_type_name(&other)
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
