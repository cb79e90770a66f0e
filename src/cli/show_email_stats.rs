use crate::database::get_message_stats;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn show_email_stats(&self) -> Result<()> {
        println!("\n📈 Email Database Statistics");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let stats = get_message_stats(&self.db_pool).await?;

        println!("📧 Messages tracked: {}", stats.total_messages);
        println!("📤 Messages with sends: {}", stats.messages_with_sends);
        println!("📬 Total emails sent: {}", stats.total_sent);
        println!("👀 Total opens: {}", stats.total_opened);
        println!("🖱️  Total clicks: {}", stats.total_clicked);
        println!("🚫 Total unsubscribes: {}", stats.total_unsubscribed);

        if stats.total_sent > 0 {
            println!(
                "📊 Overall open rate: {:.1}%",
                stats.total_opened as f64 / stats.total_sent as f64 * 100.0
            );
            println!(
                "📊 Overall click rate: {:.1}%",
                stats.total_clicked as f64 / stats.total_sent as f64 * 100.0
            );
        }

        Ok(())
    }
}
