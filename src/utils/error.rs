//! Error Handling
//!
//! Unified error type returned by the analysis pipeline and its transports.
//! Input-side failures come from `perf_analyzer_core::CoreError`; model-call
//! failures are folded in from `perf_analyzer_llm::LlmError`.

use perf_analyzer_core::{CoreError, InputKind};
use perf_analyzer_llm::LlmError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Input errors (missing file, malformed or empty data, invalid context)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The model service answered with a non-success status
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The model service could not be reached or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Every retry attempt against the model service failed
    #[error("Exhausted retries after {attempts} attempts: {message}")]
    ExhaustedRetries { attempts: u32, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The input kind when this is a missing-file error
    pub fn missing_input(&self) -> Option<InputKind> {
        match self {
            AppError::Core(core) => core.missing_input(),
            _ => None,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NetworkError { message } => AppError::Transport(message),
            LlmError::RetriesExhausted {
                attempts,
                last_error,
            } => AppError::ExhaustedRetries {
                attempts,
                message: last_error,
            },
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Convert AppError to a string suitable for user-facing responses
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
