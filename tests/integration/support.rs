//! Test Support
//!
//! On-disk fixtures and a scripted `LlmProvider` that records every call.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use perf_analyzer::models::TestContext;
use perf_analyzer::services::report::{AnalysisOptions, AnalysisRequest, ReportParser};
use perf_analyzer_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    RetryPolicy, StopReason, UsageStats,
};

/// One recorded `send_message` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub options: LlmRequestOptions,
}

/// Provider that replays scripted replies in order and records every call.
pub struct MockProvider {
    config: ProviderConfig,
    replies: Mutex<VecDeque<LlmResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn new(replies: Vec<LlmResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            config: ProviderConfig {
                model: "mock-model".to_string(),
                ..Default::default()
            },
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.calls.lock().unwrap().push(RecordedCall {
            prompt,
            options: request_options,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Other {
                    message: "mock has no scripted reply left".to_string(),
                })
            })?;

        Ok(LlmResponse {
            content: Some(reply),
            stop_reason: StopReason::EndTurn,
            usage: UsageStats {
                input_tokens: 10,
                output_tokens: 5,
            },
            model: self.config.model.clone(),
        })
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Options with no backoff delay, so retry tests run instantly
pub fn fast_options(max_attempts: u32) -> AnalysisOptions {
    AnalysisOptions {
        retry: RetryPolicy {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
            max_elapsed_secs: 60,
        },
        ..Default::default()
    }
}

pub fn parser_with(provider: Arc<MockProvider>, options: AnalysisOptions) -> ReportParser {
    ReportParser::new(provider, options)
}

pub fn valid_test_config() -> Value {
    json!({
        "context": {
            "test_name": "login-soak",
            "actual_load": {"concurrent_users": 200, "duration_min": 30},
            "infra": {"nodes": 3, "cpu_cores_per_node": 4, "memory_gb_per_node": 16},
            "expected_validations": {"max_response_time_ms": 800, "response_code": 200}
        },
        "questions": ["Is the p95 response time within SLA?"],
        "test_feature": "login"
    })
}

/// Files for one run, kept alive as long as the returned `TempDir`.
pub struct Fixture {
    pub dir: TempDir,
    pub request: AnalysisRequest,
}

impl Fixture {
    /// Scenario A inputs: `Total` metrics, one log with one ERROR line,
    /// one context row.
    pub fn scenario_a() -> Self {
        let dir = TempDir::new().unwrap();
        let summary = write(&dir, "statistics.json", r#"{"Total": {"avg_response_ms": 120}}"#);
        let log = write(&dir, "jmeter.log", "INFO start\nERROR timeout\n");
        let context = write(&dir, "scenarios.csv", "feature,note\nlogin,baseline\n");

        let test_context: TestContext = serde_json::from_value(valid_test_config()).unwrap();

        Self {
            request: AnalysisRequest {
                test_context,
                summary_path: summary,
                log_paths: vec![log],
                context_path: context,
            },
            dir,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, body: &str) -> PathBuf {
        write(&self.dir, name, body)
    }
}

pub fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}
