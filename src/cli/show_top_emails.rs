use crate::database::fetch_email_records;
use crate::metrics::{annotate_and_rank, top_performers, worst_performers};
use crate::models::{CliApp, Result};

const SHOWN_PER_SIDE: usize = 5;

impl CliApp {
    pub async fn show_top_emails(&self) -> Result<()> {
        println!("\n🏆 Email Performance Ranking");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let records =
            fetch_email_records(&self.db_pool, &self.config.analysis.target_ids).await?;
        let scored = annotate_and_rank(&records);

        if scored.is_empty() {
            println!("🤷 No emails with sends to rank");
            return Ok(());
        }

        println!("\n🥇 Top performers:");
        for (i, email) in top_performers(&scored, SHOWN_PER_SIDE).iter().enumerate() {
            println!(
                "  {}. {} (score {:.1}, open {:.1}%, click {:.1}%)",
                i + 1,
                email.record.subject,
                email.metrics.effectiveness_score,
                email.metrics.open_rate,
                email.metrics.click_rate
            );
        }

        println!("\n🥀 Worst performers:");
        for (i, email) in worst_performers(&scored, SHOWN_PER_SIDE).iter().enumerate() {
            println!(
                "  {}. {} (score {:.1}, open {:.1}%, unsub {:.2}%)",
                i + 1,
                email.record.subject,
                email.metrics.effectiveness_score,
                email.metrics.open_rate,
                email.metrics.unsub_rate
            );
        }

        Ok(())
    }
}
