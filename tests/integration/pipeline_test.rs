//! Pipeline Integration Tests
//!
//! Drives `ReportParser::analyze` end to end against files on disk:
//! - Scenario A: metrics, digest and prompt contents
//! - Scenario B: unparseable reply becomes the error envelope
//! - Scenario C: a missing summary stops the run before any model call
//! - Distinct errors for each missing input, retries, strict schema mode

use serde_json::{json, Value};

use perf_analyzer::models::analysis::{PARSE_FAILURE_MESSAGE, SCHEMA_MISMATCH_MESSAGE};
use perf_analyzer::models::{AnalysisResult, SchemaValidation};
use perf_analyzer::services::report::{AnalysisOptions, DigestOptions};
use perf_analyzer::utils::error::AppError;
use perf_analyzer_core::{CoreError, InputKind};
use perf_analyzer_llm::{LlmError, ResponseFormat};

use crate::support::{fast_options, parser_with, Fixture, MockProvider};

fn full_reply() -> Value {
    json!({
        "bottlenecks": [{
            "component": "auth-service",
            "severity": "high",
            "phase": "steady_state",
            "description": "Token endpoint times out under load",
            "evidence": ["ERROR timeout"]
        }],
        "recommendations": {
            "infra": [{"priority": "high", "action": "Add one auth node", "reason": "timeouts at 200 users"}],
            "application": [],
            "config": [],
            "api_gateway": []
        },
        "infra_suggestions": {
            "cpu_cores_per_node": {"current": 4, "suggested": 8, "note": "CPU bound"}
        },
        "answers": [{
            "question": "Is the p95 response time within SLA?",
            "answer": "Yes",
            "evidence": ["avg_response_ms=120"]
        }],
        "test_validation_analysis": {
            "details": {
                "max_response_time_ms": {"expected": 800, "actual": 120, "status": "Pass"}
            }
        },
        "test_feature_justification": {
            "feature_name": "login",
            "characteristics": "Password hashing is CPU heavy",
            "expected_load_behavior": "Morning burst",
            "recommendation_alignment": "Scale auth horizontally"
        }
    })
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_a_prompt_carries_inputs() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::replying(&full_reply().to_string());
    let parser = parser_with(provider.clone(), AnalysisOptions::default());

    let prepared = parser.prepare(&fixture.request).unwrap();
    assert_eq!(Value::Object(prepared.metrics.clone()), json!({"avg_response_ms": 120}));
    assert_eq!(
        prepared.digest.render(),
        "--- Log from file: jmeter.log ---\nERROR timeout"
    );
    assert!(!prepared.digest.render().contains("INFO start"));
    assert_eq!(prepared.records.len(), 1);
    assert_eq!(prepared.records[0]["feature"], "login");
    assert_eq!(prepared.records[0]["note"], "baseline");

    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert_eq!(outcome.recommendation, AnalysisResult::Parsed(full_reply()));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].options.response_format, ResponseFormat::Json);
    assert!(calls[0].prompt.contains("login"));
    assert!(calls[0].prompt.contains("\"avg_response_ms\": 120"));
    assert!(calls[0].prompt.contains("ERROR timeout"));
    assert_eq!(calls[0].prompt, prepared.prompt.as_str());
}

#[tokio::test]
async fn test_scenario_b_unparseable_reply() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::replying("not json");
    let parser = parser_with(provider, AnalysisOptions::default());

    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "recommendation": {
                "error": "Failed to parse LLM response into JSON.",
                "raw_response": "not json"
            }
        })
    );
}

#[tokio::test]
async fn test_scenario_c_missing_summary_makes_no_calls() {
    let fixture = Fixture::scenario_a();
    std::fs::remove_file(&fixture.request.summary_path).unwrap();
    let provider = MockProvider::replying("{}");
    let parser = parser_with(provider.clone(), AnalysisOptions::default());

    let err = parser.analyze(&fixture.request).await.unwrap_err();
    assert_eq!(err.missing_input(), Some(InputKind::SummaryFile));
    assert_eq!(provider.call_count(), 0);
}

// ============================================================================
// Input failures
// ============================================================================

#[tokio::test]
async fn test_each_missing_input_is_distinct_and_precedes_the_model() {
    let cases: Vec<(&str, Option<InputKind>)> = vec![
        ("summary", Some(InputKind::SummaryFile)),
        ("log", Some(InputKind::LogFile)),
        ("context", Some(InputKind::ContextFile)),
        ("keys", None),
    ];

    for (case, expected) in cases {
        let mut fixture = Fixture::scenario_a();
        match case {
            "summary" => fixture.request.summary_path = fixture.path("nope.json"),
            "log" => fixture.request.log_paths.push(fixture.path("nope.log")),
            "context" => fixture.request.context_path = fixture.path("nope.csv"),
            _ => {
                fixture.request.test_context.context.remove("test_name");
            }
        }

        let provider = MockProvider::replying("{}");
        let parser = parser_with(provider.clone(), AnalysisOptions::default());
        let err = parser.analyze(&fixture.request).await.unwrap_err();

        assert_eq!(err.missing_input(), expected, "case {}", case);
        if case == "keys" {
            assert!(matches!(
                err,
                AppError::Core(CoreError::MissingContextKeys(ref keys)) if keys == &vec!["test_name".to_string()]
            ));
        }
        assert_eq!(provider.call_count(), 0, "case {}", case);
    }
}

#[tokio::test]
async fn test_malformed_summary_is_format_error() {
    let mut fixture = Fixture::scenario_a();
    fixture.request.summary_path = fixture.write("broken.json", "{\"Total\":");
    let provider = MockProvider::replying("{}");
    let parser = parser_with(provider.clone(), AnalysisOptions::default());

    let err = parser.analyze(&fixture.request).await.unwrap_err();
    assert!(matches!(err, AppError::Core(CoreError::Format(_))));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_header_only_context_is_empty_data() {
    let mut fixture = Fixture::scenario_a();
    fixture.request.context_path = fixture.write("empty.csv", "feature,note\n");
    let parser = parser_with(MockProvider::replying("{}"), AnalysisOptions::default());

    let err = parser.analyze(&fixture.request).await.unwrap_err();
    assert!(matches!(err, AppError::Core(CoreError::EmptyData(_))));
}

#[tokio::test]
async fn test_summary_without_total_still_analyzes() {
    let mut fixture = Fixture::scenario_a();
    fixture.request.summary_path = fixture.write("no_total.json", r#"{"Login": {"avg": 1}}"#);
    let provider = MockProvider::replying("{\"answers\": []}");
    let parser = parser_with(provider.clone(), AnalysisOptions::default());

    let prepared = parser.prepare(&fixture.request).unwrap();
    assert!(prepared.metrics.is_empty());

    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert!(outcome.recommendation.is_parsed());
}

// ============================================================================
// Digest and context properties
// ============================================================================

#[test]
fn test_digest_over_many_files() {
    let mut fixture = Fixture::scenario_a();
    let quiet = fixture.write("quiet.log", "INFO a\nDEBUG b\n");
    let noisy = fixture.write("noisy.log", "WARN pool low\nINFO ok\nERROR refused\n");
    fixture.request.log_paths = vec![noisy, quiet, fixture.request.log_paths[0].clone()];

    let parser = parser_with(MockProvider::replying("{}"), AnalysisOptions::default());
    let digest = parser.prepare(&fixture.request).unwrap().digest;
    let text = digest.render();

    for line in text.lines().filter(|l| !l.starts_with("--- ")) {
        assert!(line.contains("WARN") || line.contains("ERROR"), "line {:?}", line);
    }
    assert!(!text.contains("quiet.log"));
    let noisy_at = text.find("noisy.log").unwrap();
    let jmeter_at = text.find("jmeter.log").unwrap();
    assert!(noisy_at < jmeter_at);
}

#[test]
fn test_digest_cap_applies_through_options() {
    let mut fixture = Fixture::scenario_a();
    let body: String = (0..10).map(|i| format!("ERROR line {}\n", i)).collect();
    fixture.request.log_paths = vec![fixture.write("big.log", &body)];

    let options = AnalysisOptions {
        digest: DigestOptions::capped(4),
        ..Default::default()
    };
    let parser = parser_with(MockProvider::replying("{}"), options);
    let digest = parser.prepare(&fixture.request).unwrap().digest;

    assert_eq!(digest.line_count(), 4);
    assert!(digest
        .render()
        .ends_with("--- Truncated: 6 more WARN/ERROR lines omitted ---"));
}

#[test]
fn test_context_returns_every_row_as_text() {
    let mut fixture = Fixture::scenario_a();
    fixture.request.context_path = fixture.write(
        "many.csv",
        "feature,users,ok\nlogin,100,true\nsearch,250,false\ncheckout,75,true\n",
    );

    let parser = parser_with(MockProvider::replying("{}"), AnalysisOptions::default());
    let records = parser.prepare(&fixture.request).unwrap().records;

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.len() == 3));
    assert_eq!(records[1]["users"], "250");
    assert_eq!(records[2]["ok"], "true");
}

#[test]
fn test_prompt_is_reproducible_across_runs() {
    let fixture = Fixture::scenario_a();
    let parser = parser_with(MockProvider::replying("{}"), AnalysisOptions::default());

    let first = parser.prepare(&fixture.request).unwrap().prompt;
    let second = parser.prepare(&fixture.request).unwrap().prompt;
    assert_eq!(first, second);
}

// ============================================================================
// Model call behavior
// ============================================================================

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::new(vec![
        Err(LlmError::ServerError {
            message: "overloaded".to_string(),
            status: Some(503),
        }),
        Ok("{\"answers\": []}".to_string()),
    ]);
    let parser = parser_with(provider.clone(), fast_options(3));

    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert_eq!(outcome.recommendation, AnalysisResult::Parsed(json!({"answers": []})));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_exhausted_retries_surface_distinctly() {
    let fixture = Fixture::scenario_a();
    let unreachable = || {
        Err(LlmError::NetworkError {
            message: "connection refused".to_string(),
        })
    };
    let provider = MockProvider::new(vec![unreachable(), unreachable(), unreachable()]);
    let parser = parser_with(provider.clone(), fast_options(3));

    let err = parser.analyze(&fixture.request).await.unwrap_err();
    assert!(matches!(err, AppError::ExhaustedRetries { attempts: 3, .. }));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_single_attempt_keeps_transport_error() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::new(vec![Err(LlmError::NetworkError {
        message: "connection refused".to_string(),
    })]);
    let parser = parser_with(provider.clone(), fast_options(1));

    let err = parser.analyze(&fixture.request).await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::new(vec![Err(LlmError::AuthenticationFailed {
        message: "gemini: Invalid API key".to_string(),
    })]);
    let parser = parser_with(provider.clone(), fast_options(3));

    let err = parser.analyze(&fixture.request).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_strict_schema_validation() {
    let fixture = Fixture::scenario_a();
    let strict = AnalysisOptions {
        schema_validation: SchemaValidation::Strict,
        ..Default::default()
    };

    let parser = parser_with(MockProvider::replying(&full_reply().to_string()), strict.clone());
    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert_eq!(outcome.recommendation, AnalysisResult::Parsed(full_reply()));

    let partial = r#"{"bottlenecks": []}"#;
    let parser = parser_with(MockProvider::replying(partial), strict);
    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert_eq!(
        serde_json::to_value(&outcome.recommendation).unwrap(),
        json!({"error": SCHEMA_MISMATCH_MESSAGE, "raw_response": partial})
    );
}

#[tokio::test]
async fn test_empty_reply_becomes_envelope() {
    let fixture = Fixture::scenario_a();
    let parser = parser_with(MockProvider::replying(""), AnalysisOptions::default());

    let outcome = parser.analyze(&fixture.request).await.unwrap();
    assert_eq!(
        serde_json::to_value(&outcome.recommendation).unwrap(),
        json!({"error": PARSE_FAILURE_MESSAGE, "raw_response": ""})
    );
}
