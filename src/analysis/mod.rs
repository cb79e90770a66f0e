use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::batch;
use crate::cache::{CacheEntry, ResultCache};
use crate::llm::{generate_with_retry, Generator, LlmError, RetryPolicy};
use crate::metrics::{self, ScoredEmail};
use crate::models::{ChatMessage, EmailRecord};

pub mod prompts;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Generation(#[from] LlmError),
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: String,
    pub context_summary: String,
    pub from_cache: bool,
}

/// Drives one full analysis: cache check, metric annotation, ranked
/// batching, per-batch generation through the shared retry wrapper, final
/// synthesis, cache store. Also hosts the single-call operations (chat,
/// critique) that reuse only the retry wrapper.
///
/// Clones share the generator; the struct assumes one logical run at a
/// time and does no locking itself.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    generator: Arc<dyn Generator>,
    cache: ResultCache,
    retry: RetryPolicy,
    inter_batch_delay: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(
        generator: Arc<dyn Generator>,
        cache: ResultCache,
        retry: RetryPolicy,
        inter_batch_delay: Duration,
    ) -> Self {
        Self {
            generator,
            cache,
            retry,
            inter_batch_delay,
        }
    }

    /// Standard wiring: Gemini from the environment, file cache and retry
    /// policy from config. Fails fast when the API key is missing.
    pub fn from_config(
        config: &crate::config::Config,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let generator = crate::llm::GeminiClient::from_env(config.gemini.clone())?;
        Ok(Self::new(
            Arc::new(generator),
            ResultCache::new(config.cache.path.clone()),
            RetryPolicy::from(&config.retry),
            Duration::from_millis(config.analysis.inter_batch_delay_ms),
        ))
    }

    pub async fn run_analysis(
        &self,
        records: &[EmailRecord],
        force_refresh: bool,
        batch_size: usize,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if records.is_empty() {
            return Err(AnalysisError::Data(
                "no email records available for analysis".to_string(),
            ));
        }

        let fingerprint = ResultCache::fingerprint(records);

        if !force_refresh {
            if let Some(entry) = self.cache.load().await {
                if entry.data_hash == fingerprint {
                    info!(
                        "Reusing cached analysis of {} emails from {}",
                        entry.record_count, entry.generated_at
                    );
                    return Ok(AnalysisOutcome {
                        report: entry.report,
                        context_summary: entry.context_summary,
                        from_cache: true,
                    });
                }
                debug!("Cached analysis is stale, email data changed since {}", entry.generated_at);
            }
        }

        let scored = metrics::annotate_and_rank(records);
        if scored.is_empty() {
            return Err(AnalysisError::Data(
                "every email record has a zero send count".to_string(),
            ));
        }

        let batches = batch::plan_batches(&scored, batch_size)?;
        let total_batches = batches.len();
        let mut batch_analyses = Vec::with_capacity(total_batches);

        for email_batch in &batches {
            info!(
                "Analyzing batch {}/{} ({} emails)",
                email_batch.index,
                email_batch.total,
                email_batch.emails.len()
            );

            let prompt = prompts::batch_analysis_prompt(email_batch);
            let text = generate_with_retry(self.generator.as_ref(), &prompt, &self.retry).await?;
            batch_analyses.push(format!(
                "\n--- BATCH {} ANALYSIS ---\n{}\n",
                email_batch.index, text
            ));

            // Pace successive batches; no pause after the last one.
            if email_batch.index < total_batches {
                tokio::time::sleep(self.inter_batch_delay).await;
            }
        }

        info!("Generating comprehensive analysis from {} batches", total_batches);
        let final_prompt = prompts::synthesis_prompt(&batch_analyses);
        let report = generate_with_retry(self.generator.as_ref(), &final_prompt, &self.retry).await?;

        let context_summary = build_context_summary(&scored);
        let (avg_open_rate, avg_click_rate, avg_unsub_rate) = metrics::average_rates(&scored);

        let entry = CacheEntry {
            data_hash: fingerprint,
            report: report.clone(),
            context_summary: context_summary.clone(),
            generated_at: Utc::now(),
            record_count: scored.len(),
            avg_open_rate,
            avg_click_rate,
            avg_unsub_rate,
        };
        self.cache.store(&entry).await;

        info!("Batch analysis completed for {} emails", scored.len());

        Ok(AnalysisOutcome {
            report,
            context_summary,
            from_cache: false,
        })
    }

    /// One consultation turn. History is truncated to the most recent
    /// messages inside prompt construction; no batching, no caching.
    pub async fn ask_expert(
        &self,
        question: &str,
        history: &[ChatMessage],
        context: Option<&str>,
    ) -> Result<String, AnalysisError> {
        let prompt = prompts::chat_prompt(question, history, context);
        let response = generate_with_retry(self.generator.as_ref(), &prompt, &self.retry).await?;
        info!("Expert consultation response generated");
        Ok(response)
    }

    /// Improvement recommendations for one pasted email.
    pub async fn critique_email(
        &self,
        content: &str,
        subject: Option<&str>,
    ) -> Result<String, AnalysisError> {
        let prompt = prompts::critique_prompt(content, subject);
        let response = generate_with_retry(self.generator.as_ref(), &prompt, &self.retry).await?;
        info!("Single email critique completed");
        Ok(response)
    }

    pub async fn clear_cache(&self) {
        self.cache.invalidate().await;
    }
}

fn build_context_summary(scored: &[ScoredEmail]) -> String {
    let (avg_open, avg_click, avg_unsub) = metrics::average_rates(scored);
    let top_subject = scored
        .first()
        .map(|s| s.record.subject.as_str())
        .unwrap_or("N/A");

    format!(
        "Email Performance Summary:\n\
- Total emails analyzed: {}\n\
- Average open rate: {:.2}%\n\
- Average click rate: {:.2}%\n\
- Average unsubscribe rate: {:.2}%\n\
- Top performing email subject: {}",
        scored.len(),
        avg_open,
        avg_click,
        avg_unsub,
        top_subject
    )
}
