use regex::Regex;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::GeminiConfig;
use crate::llm::{Generator, LlmError};

/// Decides what kind of quota failure a 429 body represents. The vendor
/// encodes the daily cap and the per-minute limit in the same status code
/// and only distinguishes them in the message text, so the matching lives
/// here at the adapter boundary where it can be reconfigured.
#[derive(Debug, Clone)]
pub struct QuotaPolicy {
    daily_markers: Vec<String>,
    daily_limit: u32,
    retry_after: Regex,
}

impl QuotaPolicy {
    pub fn new(daily_markers: Vec<String>, daily_limit: u32) -> Self {
        Self {
            daily_markers,
            daily_limit,
            retry_after: Regex::new(r"(?i)retry in ([0-9.]+)s").unwrap(),
        }
    }

    pub fn classify_quota_error(&self, body: &str) -> LlmError {
        if self.daily_markers.iter().any(|marker| body.contains(marker)) {
            return LlmError::DailyQuotaExhausted {
                limit: self.daily_limit,
            };
        }

        let retry_after = self
            .retry_after
            .captures(body)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(Duration::from_secs_f64);

        LlmError::RateLimited { retry_after }
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    api_key: String,
    client: Client,
    quota: QuotaPolicy,
}

impl GeminiClient {
    /// Builds the client from `GEMINI_API_KEY` in the environment. A
    /// missing key is fatal configuration, surfaced before any request.
    pub fn from_env(
        config: GeminiConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            error!("GEMINI_API_KEY environment variable is not set");
            "GEMINI_API_KEY must be set in the environment"
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let quota = QuotaPolicy::new(
            config.daily_quota_markers.clone(),
            config.daily_request_limit,
        );

        info!("Gemini client initialized with model: {}", config.model);

        Ok(Self {
            config,
            api_key,
            client,
            quota,
        })
    }
}

#[async_trait::async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        debug!("Sending generation request ({} prompt chars)", prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let text = response.text().await.unwrap_or_default();
            return Err(self.quota.classify_quota_error(&text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, text);
            return Err(LlmError::Transport(format!(
                "Gemini request failed with {}: {}",
                status, text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let text = json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::Transport(
                "Gemini response contained no candidate text".to_string(),
            ));
        }

        Ok(text)
    }
}
