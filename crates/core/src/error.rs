//! Core Error Types
//!
//! Defines the input-side error taxonomy shared across the Perf Analyzer
//! workspace. These error types are dependency-free (only thiserror + std) to
//! keep the core crate lightweight.
//!
//! The main crate extends these with upstream/transport variants for the
//! model call (see `perf_analyzer::utils::error::AppError`).

use std::path::PathBuf;

use thiserror::Error;

/// Which pipeline input a file-level error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Summary-statistics document (JSON)
    SummaryFile,
    /// Load-generator execution log
    LogFile,
    /// Tabular context dataset (CSV)
    ContextFile,
    /// Test configuration document (JSON)
    TestConfig,
}

impl InputKind {
    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::SummaryFile => "Summary file",
            InputKind::LogFile => "Log file",
            InputKind::ContextFile => "Context file",
            InputKind::TestConfig => "Test config file",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Core error type for the Perf Analyzer workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A referenced input path does not exist
    #[error("{kind} not found at: {}", path.display())]
    NotFound { kind: InputKind, path: PathBuf },

    /// Input is present but not parseable
    #[error("Format error: {0}")]
    Format(String),

    /// Input is present but carries no data rows
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Any other I/O or decoding fault, always naming the resource
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Required keys missing from the test context
    #[error("Missing required fields in test_config: {}", .0.join(", "))]
    MissingContextKeys(Vec<String>),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a not found error for the given input
    pub fn not_found(kind: InputKind, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            kind,
            path: path.into(),
        }
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create an empty data error
    pub fn empty_data(msg: impl Into<String>) -> Self {
        Self::EmptyData(msg.into())
    }

    /// Create an unexpected error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The input kind for `NotFound` errors
    pub fn missing_input(&self) -> Option<InputKind> {
        match self {
            CoreError::NotFound { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
