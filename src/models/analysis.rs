//! Analysis Result Models
//!
//! What the pipeline hands back: the parsed model reply, or an envelope
//! carrying the raw text when the reply could not be used.

use serde::{Deserialize, Serialize};

/// Envelope message when the reply is not JSON.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse LLM response into JSON.";

/// Envelope message when the reply is JSON but fails strict schema validation.
pub const SCHEMA_MISMATCH_MESSAGE: &str = "LLM response did not match the analysis schema.";

/// Error envelope wrapping an unusable model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseFailure {
    pub error: String,
    pub raw_response: String,
}

/// Either the parsed model reply or a parse-failure envelope.
///
/// Serializes without a tag, so callers see exactly the reply object or
/// exactly `{"error": ..., "raw_response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Failed(ParseFailure),
    Parsed(serde_json::Value),
}

impl AnalysisResult {
    /// Envelope for a reply that is not JSON
    pub fn parse_failure(raw_response: impl Into<String>) -> Self {
        AnalysisResult::Failed(ParseFailure {
            error: PARSE_FAILURE_MESSAGE.to_string(),
            raw_response: raw_response.into(),
        })
    }

    /// Envelope for a reply that failed schema validation
    pub fn schema_mismatch(raw_response: impl Into<String>) -> Self {
        AnalysisResult::Failed(ParseFailure {
            error: SCHEMA_MISMATCH_MESSAGE.to_string(),
            raw_response: raw_response.into(),
        })
    }

    /// Whether the reply was usable
    pub fn is_parsed(&self) -> bool {
        matches!(self, AnalysisResult::Parsed(_))
    }

    /// The parsed reply, if any
    pub fn parsed(&self) -> Option<&serde_json::Value> {
        match self {
            AnalysisResult::Parsed(value) => Some(value),
            AnalysisResult::Failed(_) => None,
        }
    }
}

/// Return value of `ReportParser::analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub recommendation: AnalysisResult,
}
