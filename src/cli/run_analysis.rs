use tracing::info;

use crate::analysis::AnalysisError;
use crate::database::fetch_email_records;
use crate::llm::LlmError;
use crate::models::{CliApp, ExpertSession, Result};

impl CliApp {
    pub async fn run_analysis(
        &self,
        session: &mut ExpertSession,
        force_refresh: bool,
    ) -> Result<()> {
        println!("\n📊 Complete Email Analysis");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        println!("📥 Loading emails from database...");
        let records =
            fetch_email_records(&self.db_pool, &self.config.analysis.target_ids).await?;

        if records.is_empty() {
            println!("🤷 No email data found in the database");
            return Ok(());
        }

        if force_refresh {
            println!("🔄 Ignoring any cached analysis for this run");
        }
        println!(
            "🤖 Analyzing {} emails with Gemini... this may take a few minutes.",
            records.len()
        );

        let outcome = match self
            .orchestrator
            .run_analysis(&records, force_refresh, self.config.analysis.batch_size)
            .await
        {
            Ok(outcome) => outcome,
            Err(AnalysisError::Generation(LlmError::DailyQuotaExhausted { limit })) => {
                println!("\n⚠️  Daily Limit Reached");
                println!(
                    "You have reached the daily limit of {} requests on the free tier.",
                    limit
                );
                println!("The limit resets daily at 00:00 UTC, so try again tomorrow.");
                return Ok(());
            }
            Err(AnalysisError::Generation(LlmError::RateLimited { retry_after })) => {
                match retry_after {
                    Some(wait) => println!(
                        "\n⚠️  Rate limit exceeded. Please wait {:.0} seconds and try again.",
                        wait.as_secs_f64()
                    ),
                    None => println!("\n⚠️  Rate limit exceeded. Please wait a minute and try again."),
                }
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if outcome.from_cache {
            println!("✅ Data unchanged since the last run, showing the cached analysis");
        } else {
            println!("✅ Analysis completed successfully!");
        }

        println!("\n{}", "=".repeat(80));
        println!("EMAIL EFFECTIVENESS ANALYSIS RESULTS");
        println!("{}", "=".repeat(80));
        println!("{}", outcome.report);
        println!("{}\n", "=".repeat(80));

        println!("💡 Tip: use '💬 Chat with the email marketing expert' to ask questions about this analysis.");

        session.context = Some(outcome.context_summary);
        info!("Analysis context stored for the chat session");

        Ok(())
    }
}
