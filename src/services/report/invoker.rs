//! Analysis Invoker
//!
//! Sends the composed prompt to the configured model, asking for a JSON
//! reply, and hands back the raw reply text.

use std::sync::Arc;

use perf_analyzer_llm::{send_with_retry, LlmProvider, LlmRequestOptions, Message, RetryPolicy};

use super::prompt::AnalysisPrompt;
use crate::utils::error::AppResult;

/// Model call wrapper used by `ReportParser`.
#[derive(Clone)]
pub struct AnalysisInvoker {
    provider: Arc<dyn LlmProvider>,
    retry: RetryPolicy,
}

impl AnalysisInvoker {
    pub fn new(provider: Arc<dyn LlmProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Issue the completion request and return the reply body.
    ///
    /// An empty reply is returned as `""` and left to the reconciler.
    pub async fn invoke(&self, prompt: &AnalysisPrompt) -> AppResult<String> {
        let messages = [Message::user(prompt.as_str())];

        tracing::info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            max_attempts = self.retry.max_attempts,
            "requesting analysis from model"
        );

        let response = send_with_retry(
            self.provider.as_ref(),
            &messages,
            None,
            &LlmRequestOptions::json(),
            &self.retry,
        )
        .await?;

        tracing::info!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model reply received"
        );

        Ok(response.content.unwrap_or_default())
    }
}

impl std::fmt::Debug for AnalysisInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisInvoker")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("retry", &self.retry)
            .finish()
    }
}
