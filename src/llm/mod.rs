use std::time::Duration;

pub mod gemini;
pub mod retry;

pub use gemini::{GeminiClient, QuotaPolicy};
pub use retry::{generate_with_retry, RetryPolicy};

/// Closed classification of generation failures. Adapters map vendor
/// errors into these variants at the boundary; the retry logic only ever
/// switches on this enum.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("daily quota exhausted: the free tier allows {limit} requests per day; the limit resets at 00:00 UTC")]
    DailyQuotaExhausted { limit: u32 },

    #[error("rate limited by the generation API")]
    RateLimited { retry_after: Option<Duration> },

    #[error("generation request failed: {0}")]
    Transport(String),
}

/// The one capability the analysis core needs from the outside world:
/// turn a prompt into text, or fail with a classified error.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
