//! Response Reconciler
//!
//! Turns the raw model reply into an `AnalysisResult`. Never fails: a reply
//! that cannot be used becomes an error envelope carrying the raw text.

use serde::Deserialize;

use crate::models::schema::{AnalysisReport, SchemaValidation};
use crate::models::AnalysisResult;

/// Parse `raw` and, under `SchemaValidation::Strict`, check its shape.
///
/// A usable reply is returned exactly as parsed.
pub fn reconcile(raw: &str, validation: SchemaValidation) -> AnalysisResult {
    let parsed: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, reply_bytes = raw.len(), "model reply is not valid JSON");
            return AnalysisResult::parse_failure(raw);
        }
    };

    if validation == SchemaValidation::Strict {
        if let Err(e) = AnalysisReport::deserialize(&parsed) {
            tracing::warn!(error = %e, "model reply does not match the analysis schema");
            return AnalysisResult::schema_mismatch(raw);
        }
    }

    AnalysisResult::Parsed(parsed)
}
