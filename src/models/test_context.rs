//! Test Context Model
//!
//! Caller-supplied test and infrastructure configuration: the `context`
//! mapping, the custom evaluation questions, and the feature under test.

use std::path::Path;

use perf_analyzer_core::{CoreError, CoreResult, InputKind};
use serde::{Deserialize, Serialize};

/// Keys every `context` mapping must carry.
pub const REQUIRED_KEYS: [&str; 4] = [
    "test_name",
    "actual_load",
    "infra",
    "expected_validations",
];

/// Test configuration as read from `test_config.json` or the HTTP form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestContext {
    /// Test and infrastructure details
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
    /// Free-text evaluation questions, in the order they should be answered
    #[serde(default)]
    pub questions: Vec<String>,
    /// Feature under test (e.g. "login", "checkout")
    #[serde(default)]
    pub test_feature: String,
}

impl TestContext {
    /// Parse a test configuration document.
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        serde_json::from_str(raw).map_err(|e| CoreError::format(e.to_string()))
    }

    /// Read and parse a test configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::not_found(InputKind::TestConfig, path));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::unexpected(format!(
                "Error reading test config {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            CoreError::format(format!(
                "Invalid JSON in test config {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Replace the feature under test (the HTTP form sends it separately).
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.test_feature = feature.into();
        self
    }

    /// Feature name with surrounding whitespace removed
    pub fn feature(&self) -> &str {
        self.test_feature.trim()
    }

    /// Required context keys that are absent, in `REQUIRED_KEYS` order.
    pub fn missing_keys(&self) -> Vec<String> {
        REQUIRED_KEYS
            .iter()
            .filter(|key| !self.context.contains_key(**key))
            .map(|key| key.to_string())
            .collect()
    }

    /// Check the required keys and the feature name.
    pub fn validate(&self) -> CoreResult<()> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(CoreError::MissingContextKeys(missing));
        }
        if self.feature().is_empty() {
            return Err(CoreError::validation("'test_feature' is missing or empty"));
        }
        Ok(())
    }
}
