//! Perf Analyzer LLM
//!
//! Provides a unified interface for the completion services the analyzer can
//! delegate to:
//! - Google Gemini (`generateContent`)
//! - OpenAI and OpenAI-compatible chat completions
//!
//! Also includes the HTTP client factory and the bounded retry loop.

pub mod gemini;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod types;

use std::sync::Arc;

// Re-export main types
pub use gemini::GeminiProvider;
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use retry::{send_with_retry, RetryPolicy};
pub use types::*;

/// Instantiate the provider named by `config.provider`.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::Gemini => Arc::new(GeminiProvider::new(config)?),
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
    };
    Ok(provider)
}
