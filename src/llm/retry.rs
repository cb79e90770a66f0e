use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::llm::{Generator, LlmError};

// Added on top of a server-provided retry-after hint; the hint marks when
// the window reopens, not when a request will succeed.
const RETRY_AFTER_PAD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(20),
            backoff_multiplier: 1.5,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_secs(config.initial_delay_seconds),
            backoff_multiplier: config.backoff_multiplier,
        }
    }
}

/// Single retry wrapper shared by every generation call site. Transient
/// rate limits are retried with growing waits, the daily cap and any other
/// failure are surfaced immediately, and the attempt budget is a hard
/// ceiling: the final failed attempt's error reaches the caller as-is.
///
/// The wait before each retry is `max(hint + pad, delay)`; `delay` is then
/// raised to that wait and multiplied, so successive waits strictly
/// increase even when the server keeps sending the same hint.
pub async fn generate_with_retry(
    generator: &dyn Generator,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, LlmError> {
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!("Generation attempt {}/{}", attempt, policy.max_attempts);

        match generator.generate(prompt).await {
            Ok(text) => return Ok(text),
            Err(LlmError::RateLimited { retry_after }) if attempt < policy.max_attempts => {
                let wait = match retry_after.map(|hint| hint + RETRY_AFTER_PAD) {
                    Some(hinted) if hinted > delay => hinted,
                    _ => delay,
                };
                warn!(
                    "Quota exceeded. Waiting {:.1}s before retry {}/{}",
                    wait.as_secs_f64(),
                    attempt + 1,
                    policy.max_attempts
                );
                tokio::time::sleep(wait).await;
                delay = wait.mul_f64(policy.backoff_multiplier);
            }
            Err(LlmError::DailyQuotaExhausted { limit }) => {
                warn!(
                    "Daily quota of {} requests exhausted; not retrying",
                    limit
                );
                return Err(LlmError::DailyQuotaExhausted { limit });
            }
            Err(e) => {
                warn!("Generation failed on attempt {}: {}", attempt, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, LlmError>>>,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<String, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                call_times: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.call_times.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let times = self.call_times.lock().unwrap();
            times.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait::async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.call_times.lock().unwrap().push(Instant::now());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".to_string())))
        }
    }

    fn rate_limited(secs: Option<f64>) -> Result<String, LlmError> {
        Err(LlmError::RateLimited {
            retry_after: secs.map(Duration::from_secs_f64),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_is_exactly_max_attempts() {
        let generator = ScriptedGenerator::new(vec![
            rate_limited(None),
            rate_limited(None),
            rate_limited(None),
            rate_limited(None),
        ]);
        let policy = RetryPolicy::default();

        let result = generate_with_retry(&generator, "prompt", &policy).await;

        assert!(matches!(result, Err(LlmError::RateLimited { .. })));
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_grow_strictly_without_a_hint() {
        let generator = ScriptedGenerator::new(vec![
            rate_limited(None),
            rate_limited(None),
            rate_limited(None),
        ]);
        let policy = RetryPolicy::default();

        let _ = generate_with_retry(&generator, "prompt", &policy).await;

        let gaps = generator.gaps();
        assert_eq!(gaps.len(), 2);
        // 20s, then 20 * 1.5 = 30s
        assert!(gaps[0] >= Duration::from_secs(20));
        assert!(gaps[1] >= Duration::from_secs(30));
        assert!(gaps[1] > gaps[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn hinted_waits_are_padded_and_multiplied() {
        let generator = ScriptedGenerator::new(vec![
            rate_limited(Some(5.0)),
            rate_limited(Some(5.0)),
            Ok("recovered".to_string()),
        ]);
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 1.5,
        };

        let result = generate_with_retry(&generator, "prompt", &policy).await;

        assert_eq!(result.unwrap(), "recovered");
        let gaps = generator.gaps();
        // 5 + 2 = 7s, then 7 * 1.5 = 10.5s (the repeated 7s hint loses to
        // the grown delay)
        assert!(gaps[0] >= Duration::from_secs_f64(7.0));
        assert!(gaps[0] < Duration::from_secs_f64(8.0));
        assert!(gaps[1] >= Duration::from_secs_f64(10.5));
        assert!(gaps[1] > gaps[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn daily_exhaustion_never_retries() {
        let generator = ScriptedGenerator::new(vec![Err(LlmError::DailyQuotaExhausted {
            limit: 20,
        })]);
        let policy = RetryPolicy::default();

        let result = generate_with_retry(&generator, "prompt", &policy).await;

        assert!(matches!(
            result,
            Err(LlmError::DailyQuotaExhausted { limit: 20 })
        ));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_propagate_immediately() {
        let generator = ScriptedGenerator::new(vec![Err(LlmError::Transport(
            "connection refused".to_string(),
        ))]);
        let policy = RetryPolicy::default();

        let result = generate_with_retry(&generator, "prompt", &policy).await;

        assert!(matches!(result, Err(LlmError::Transport(_))));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_needs_no_waiting() {
        let generator = ScriptedGenerator::new(vec![Ok("first try".to_string())]);
        let policy = RetryPolicy::default();

        let start = Instant::now();
        let result = generate_with_retry(&generator, "prompt", &policy).await;

        assert_eq!(result.unwrap(), "first try");
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }
}
