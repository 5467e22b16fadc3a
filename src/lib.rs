//! Perf Analyzer
//!
//! Turns load-test artifacts (a summary-statistics document, execution logs
//! and a reference dataset) plus a test configuration into a structured
//! performance analysis produced by an LLM.
//!
//! - `services::report`: the analysis pipeline
//! - `models`: test context, schema and result types
//! - `config`: layered settings
//! - `commands`: batch and HTTP entry points

pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AnalyzerConfig;
pub use models::{AnalysisOutcome, AnalysisResult, TestContext};
pub use services::report::{AnalysisOptions, AnalysisRequest, ReportParser};
pub use utils::error::{AppError, AppResult};
