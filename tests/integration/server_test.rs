//! HTTP Endpoint Integration Tests
//!
//! Serves the router on an ephemeral local port and sends raw HTTP/1.1
//! multipart requests to it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use perf_analyzer::commands::{router, ServerState};
use perf_analyzer::services::report::AnalysisOptions;

use crate::support::{parser_with, valid_test_config, Fixture, MockProvider};

const BOUNDARY: &str = "perf-analyzer-test-boundary";

enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        body: &'a str,
    },
    Text {
        name: &'a str,
        value: String,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match part {
            Part::File {
                name,
                file_name,
                body: content,
            } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, file_name
                ));
                body.push_str("Content-Type: application/octet-stream\r\n\r\n");
                body.push_str(content);
            }
            Part::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                ));
                body.push_str(value);
            }
        }
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

fn app(fixture: &Fixture, provider: Arc<MockProvider>) -> Router {
    router(ServerState {
        parser: Arc::new(parser_with(provider, AnalysisOptions::default())),
        context_path: fixture.request.context_path.clone(),
    })
}

async fn spawn_app(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: &str,
) -> (u16, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(content_type) = content_type {
        req.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n{}", body.len(), body));
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap();
    (status, serde_json::from_str(body).unwrap())
}

async fn post_analyse(app: Router, parts: &[Part<'_>]) -> (u16, Value) {
    let addr = spawn_app(app).await;
    let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
    send_raw(addr, "POST", "/analyse", Some(&content_type), &multipart_body(parts)).await
}

fn summary_part() -> Part<'static> {
    Part::File {
        name: "summary_file",
        file_name: "statistics.json",
        body: r#"{"Total": {"avg_response_ms": 120}}"#,
    }
}

fn log_part(file_name: &'static str, body: &'static str) -> Part<'static> {
    Part::File {
        name: "jmeter_log_files",
        file_name,
        body,
    }
}

fn config_part(config: &Value) -> Part<'static> {
    Part::Text {
        name: "test_config",
        value: config.to_string(),
    }
}

fn feature_part(feature: &str) -> Part<'static> {
    Part::Text {
        name: "test_feature",
        value: feature.to_string(),
    }
}

#[tokio::test]
async fn test_health() {
    let fixture = Fixture::scenario_a();
    let addr = spawn_app(app(&fixture, MockProvider::replying("{}"))).await;

    let (status, body) = send_raw(addr, "GET", "/health", None, "").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_successful_analysis() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::replying(r#"{"bottlenecks": [], "answers": []}"#);
    let parts = [
        summary_part(),
        log_part("a.log", "INFO start\nERROR timeout\n"),
        log_part("b.log", "WARN slow\n"),
        config_part(&valid_test_config()),
        feature_part("checkout"),
    ];

    let (status, body) = post_analyse(app(&fixture, provider.clone()), &parts).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"response": {"bottlenecks": [], "answers": []}}));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    let prompt = &calls[0].prompt;
    assert!(prompt.contains("Feature Under Test: checkout"));
    assert!(prompt.contains("--- Log from file: a.log ---\nERROR timeout"));
    assert!(prompt.contains("--- Log from file: b.log ---\nWARN slow"));
    assert!(prompt.contains("\"note\": \"baseline\""));
}

#[tokio::test]
async fn test_same_log_names_do_not_collide() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::replying("{}");
    let parts = [
        summary_part(),
        log_part("jmeter.log", "ERROR first\n"),
        log_part("jmeter.log", "ERROR second\n"),
        config_part(&valid_test_config()),
        feature_part("login"),
    ];

    let (status, _) = post_analyse(app(&fixture, provider.clone()), &parts).await;
    assert_eq!(status, 200);
    let prompt = &provider.calls()[0].prompt;
    assert!(prompt.contains("ERROR first"));
    assert!(prompt.contains("ERROR second"));
}

#[tokio::test]
async fn test_unparseable_reply_is_still_200() {
    let fixture = Fixture::scenario_a();
    let parts = [
        summary_part(),
        log_part("a.log", "ERROR x\n"),
        config_part(&valid_test_config()),
        feature_part("login"),
    ];

    let (status, body) = post_analyse(app(&fixture, MockProvider::replying("not json")), &parts).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"response": {
            "error": "Failed to parse LLM response into JSON.",
            "raw_response": "not json"
        }})
    );
}

#[tokio::test]
async fn test_missing_files_rejected() {
    let fixture = Fixture::scenario_a();
    let provider = MockProvider::replying("{}");
    let parts = [
        summary_part(),
        config_part(&valid_test_config()),
        feature_part("login"),
    ];

    let (status, body) = post_analyse(app(&fixture, provider.clone()), &parts).await;
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({"error": "Both 'summary_file' and 'jmeter_log_files' are required."})
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_missing_test_config_rejected() {
    let fixture = Fixture::scenario_a();
    let parts = [summary_part(), log_part("a.log", "ERROR x\n"), feature_part("login")];

    let (status, body) = post_analyse(app(&fixture, MockProvider::replying("{}")), &parts).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Missing 'test_config' in form data."}));
}

#[tokio::test]
async fn test_invalid_test_config_json_rejected() {
    let fixture = Fixture::scenario_a();
    let parts = [
        summary_part(),
        log_part("a.log", "ERROR x\n"),
        Part::Text {
            name: "test_config",
            value: "{not json".to_string(),
        },
        feature_part("login"),
    ];

    let (status, body) = post_analyse(app(&fixture, MockProvider::replying("{}")), &parts).await;
    assert_eq!(status, 400);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON in 'test_config': "));
}

#[tokio::test]
async fn test_blank_feature_rejected() {
    let fixture = Fixture::scenario_a();
    let parts = [
        summary_part(),
        log_part("a.log", "ERROR x\n"),
        config_part(&valid_test_config()),
        feature_part("   "),
    ];

    let (status, body) = post_analyse(app(&fixture, MockProvider::replying("{}")), &parts).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Missing or empty 'test_feature' field"}));
}

#[tokio::test]
async fn test_missing_context_keys_listed() {
    let fixture = Fixture::scenario_a();
    let mut config = valid_test_config();
    let context = config["context"].as_object_mut().unwrap();
    context.remove("infra");
    context.remove("expected_validations");

    let parts = [
        summary_part(),
        log_part("a.log", "ERROR x\n"),
        config_part(&config),
        feature_part("login"),
    ];

    let (status, body) = post_analyse(app(&fixture, MockProvider::replying("{}")), &parts).await;
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({
            "error": "Missing required fields in test_config",
            "missing_keys": ["infra", "expected_validations"]
        })
    );
}

#[tokio::test]
async fn test_pipeline_failure_is_500() {
    let mut fixture = Fixture::scenario_a();
    fixture.request.context_path = fixture.path("missing.csv");
    let provider = MockProvider::replying("{}");
    let parts = [
        summary_part(),
        log_part("a.log", "ERROR x\n"),
        config_part(&valid_test_config()),
        feature_part("login"),
    ];

    let (status, body) = post_analyse(app(&fixture, provider.clone()), &parts).await;
    assert_eq!(status, 500);
    assert_eq!(body["step"], "Report Analysis");
    assert_eq!(body["status"], "failed");
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to analyze report: Context file not found at"));
    assert_eq!(provider.call_count(), 0);
}
