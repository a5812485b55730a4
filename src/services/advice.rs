use thiserror::Error;

/// Failures from the advice-fetching layer. The display strings are the
/// user-facing warnings; callers prefix a warning marker and nothing else.
#[derive(Debug, Error)]
pub enum AdviceError {
    /// Network-level failure: connection error or a non-2xx status.
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The response did not carry the expected assistant content. Carries
    /// the service-provided error message when one was present.
    #[error("Unable to fetch valid advice from the response{}", detail_suffix(.detail))]
    InvalidAdvice { detail: Option<String> },

    /// Catch-all for anything outside the two cases above.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

/// Trait for advice services (OpenRouter, OpenAI-compatible endpoints,
/// test doubles). One prompt in, the assistant's raw text out.
#[async_trait::async_trait]
pub trait AdviceService: Send + Sync {
    async fn fetch_advice(&self, prompt: &str) -> Result<String, AdviceError>;
}
