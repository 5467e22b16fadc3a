//! HTTP Endpoint
//!
//! `perf-analyzer serve`: `POST /analyse` takes the run's artifacts as a
//! multipart form and answers with the analysis; `GET /health` is a
//! liveness probe. Each request stores its uploads in its own temporary
//! directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

use crate::config::AnalyzerConfig;
use crate::models::TestContext;
use crate::services::report::{AnalysisRequest, ReportParser};
use crate::utils::error::{AppError, AppResult};

/// Upper bound on one multipart request
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

const SUMMARY_FIELD: &str = "summary_file";
const LOGS_FIELD: &str = "jmeter_log_files";
const TEST_CONFIG_FIELD: &str = "test_config";
const TEST_FEATURE_FIELD: &str = "test_feature";

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub addr: SocketAddr,

    /// Reference scenarios dataset [default: data/performance_test_scenarios.csv]
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,
}

/// Shared handler state
pub struct ServerState {
    pub parser: Arc<ReportParser>,
    pub context_path: PathBuf,
}

/// Build the router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/analyse", post(analyse_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(Arc::new(state))
}

/// Bind and serve until Ctrl-C.
pub async fn run(args: &ServeArgs, config: &AnalyzerConfig) -> AppResult<()> {
    let parser = ReportParser::from_config(config)?;
    let context_path = args
        .context
        .clone()
        .unwrap_or_else(|| config.paths.context_file.clone());

    let app = router(ServerState {
        parser: Arc::new(parser),
        context_path,
    });

    let listener = TcpListener::bind(args.addr).await?;
    tracing::info!(addr = %args.addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct AnalyseForm {
    summary: Option<Upload>,
    logs: Option<Vec<Upload>>,
    test_config: Option<String>,
    test_feature: Option<String>,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": message.into()})),
    )
        .into_response()
}

fn analysis_failed(err: &AppError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "step": "Report Analysis",
            "status": "failed",
            "error": format!("Failed to analyze report: {}", err),
        })),
    )
        .into_response()
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyseForm, Response> {
    let mut form = AnalyseForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(format!("Malformed multipart body: {}", e))),
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read field '{}': {}", name, e)))?
            .to_vec();

        match name.as_str() {
            SUMMARY_FIELD => form.summary = Some(Upload { file_name, bytes }),
            LOGS_FIELD => {
                let logs = form.logs.get_or_insert_with(Vec::new);
                // Browsers send an empty, unnamed part when no file is chosen
                if file_name.as_deref().map_or(false, |n| !n.is_empty()) || !bytes.is_empty() {
                    logs.push(Upload { file_name, bytes });
                }
            }
            TEST_CONFIG_FIELD => {
                form.test_config = Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            TEST_FEATURE_FIELD => {
                form.test_feature = Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Keep only the final path component of a client-supplied file name.
fn safe_file_name(name: Option<&str>, fallback: &str) -> String {
    name.and_then(|n| Path::new(n).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "..")
        .unwrap_or_else(|| fallback.to_string())
}

async fn store_upload(dir: &Path, file_name: String, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Write the uploads into `workdir`; log files each get their own
/// subdirectory so equal names never overwrite each other.
async fn store_uploads(
    workdir: &Path,
    summary: &Upload,
    logs: &[Upload],
) -> std::io::Result<(PathBuf, Vec<PathBuf>)> {
    let summary_path = store_upload(
        &workdir.join("summary"),
        safe_file_name(summary.file_name.as_deref(), "statistics.json"),
        &summary.bytes,
    )
    .await?;

    let mut log_paths = Vec::with_capacity(logs.len());
    for (index, log) in logs.iter().enumerate() {
        let path = store_upload(
            &workdir.join("logs").join(index.to_string()),
            safe_file_name(log.file_name.as_deref(), &format!("jmeter-{}.log", index)),
            &log.bytes,
        )
        .await?;
        log_paths.push(path);
    }
    Ok((summary_path, log_paths))
}

async fn analyse_handler(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let (summary, logs) = match (form.summary, form.logs) {
        (Some(summary), Some(logs)) => (summary, logs),
        _ => return bad_request("Both 'summary_file' and 'jmeter_log_files' are required."),
    };
    if logs.is_empty() {
        return bad_request("'jmeter_log_files' cannot be empty.");
    }

    let raw_config = match form.test_config.filter(|c| !c.is_empty()) {
        Some(raw) => raw,
        None => return bad_request("Missing 'test_config' in form data."),
    };
    let test_context: TestContext = match serde_json::from_str(&raw_config) {
        Ok(ctx) => ctx,
        Err(e) => return bad_request(format!("Invalid JSON in 'test_config': {}", e)),
    };

    let feature = form.test_feature.unwrap_or_default();
    if feature.trim().is_empty() {
        return bad_request("Missing or empty 'test_feature' field");
    }
    let test_context = test_context.with_feature(feature.trim());

    let missing_keys = test_context.missing_keys();
    if !missing_keys.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Missing required fields in test_config",
                "missing_keys": missing_keys,
            })),
        )
            .into_response();
    }

    // Dropped at the end of the request, removing the uploads
    let workdir = match TempDir::new() {
        Ok(dir) => dir,
        Err(e) => return analysis_failed(&AppError::Io(e)),
    };
    let (summary_path, log_paths) = match store_uploads(workdir.path(), &summary, &logs).await {
        Ok(paths) => paths,
        Err(e) => return analysis_failed(&AppError::Io(e)),
    };

    let request = AnalysisRequest {
        test_context,
        summary_path,
        log_paths,
        context_path: state.context_path.clone(),
    };

    match state.parser.analyze(&request).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({"response": outcome.recommendation})),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "report analysis failed");
            analysis_failed(&err)
        }
    }
}
