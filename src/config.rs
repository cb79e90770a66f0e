use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub retry: RetryConfig,
    pub gemini: GeminiConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub batch_size: usize,
    pub inter_batch_delay_ms: u64,
    // Message ids to pull from the messages table; empty = every row.
    pub target_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_seconds: u64,
    pub backoff_multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub daily_request_limit: u32,
    // Substrings that mark a 429 body as the daily cap rather than a
    // per-minute limit. Vendor-specific, so overridable here instead of
    // baked into the retry logic.
    pub daily_quota_markers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig {
                batch_size: 3,
                inter_batch_delay_ms: 2000,
                target_ids: vec![
                    "144".to_string(),
                    "145".to_string(),
                    "158".to_string(),
                    "159".to_string(),
                    "163".to_string(),
                    "164".to_string(),
                    "172".to_string(),
                    "174".to_string(),
                    "177".to_string(),
                    "178".to_string(),
                ],
            },
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_seconds: 20,
                backoff_multiplier: 1.5,
            },
            gemini: GeminiConfig {
                model: "gemini-2.5-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                timeout_seconds: 120,
                daily_request_limit: 20,
                daily_quota_markers: vec![
                    "GenerateRequestsPerDay".to_string(),
                    "free_tier_requests".to_string(),
                    "limit: 20".to_string(),
                ],
            },
            database: DatabaseConfig {
                path: "data/messages.db".to_string(),
            },
            cache: CacheConfig {
                path: "data/analysis_cache.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
