//! Report Analysis Pipeline
//!
//! Stages, leaf first:
//! - `metrics`: aggregate "Total" block from the summary document
//! - `log_digest`: WARN/ERROR lines from the execution logs
//! - `context_loader`: reference scenarios from the dataset
//! - `prompt`: deterministic prompt rendering
//! - `invoker`: the model call
//! - `reconciler`: reply to `AnalysisResult`
//! - `parser`: `ReportParser`, which runs them in order

pub mod context_loader;
pub mod invoker;
pub mod log_digest;
pub mod metrics;
pub mod parser;
pub mod prompt;
pub mod reconciler;

pub use context_loader::{read_context, ContextRecord};
pub use invoker::AnalysisInvoker;
pub use log_digest::{build_log_digest, is_high_signal, DigestOptions, LogDigest, LogSection};
pub use metrics::{extract_metrics, SummaryMetrics};
pub use parser::{AnalysisOptions, AnalysisRequest, PreparedAnalysis, ReportParser};
pub use prompt::{compose_prompt, AnalysisPrompt};
pub use reconciler::reconcile;
