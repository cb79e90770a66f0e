use dialoguer::{theme::ColorfulTheme, Select};

use crate::{
    cli::cli::MenuAction,
    models::{CliApp, ExpertSession, Result},
};
use tracing::error;

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n📧 Welcome to Email Insight!");
        println!("═══════════════════════════════════════");

        self.show_email_stats().await?;

        let mut session = ExpertSession::default();

        loop {
            let actions = vec![
                MenuAction::RunAnalysis,
                MenuAction::ForceReanalyze,
                MenuAction::ChatWithExpert,
                MenuAction::CritiqueEmail,
                MenuAction::ShowTopEmails,
                MenuAction::ShowEmailStats,
                MenuAction::ClearCache,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::RunAnalysis => {
                    if let Err(e) = self.run_analysis(&mut session, false).await {
                        error!("Analysis failed: {}", e);
                    }
                }
                MenuAction::ForceReanalyze => {
                    if let Err(e) = self.run_analysis(&mut session, true).await {
                        error!("Forced re-analysis failed: {}", e);
                    }
                }
                MenuAction::ChatWithExpert => {
                    if let Err(e) = self.run_chat(&mut session).await {
                        error!("Chat session failed: {}", e);
                    }
                }
                MenuAction::CritiqueEmail => {
                    if let Err(e) = self.run_critique(&mut session).await {
                        error!("Email critique failed: {}", e);
                    }
                }
                MenuAction::ShowTopEmails => {
                    if let Err(e) = self.show_top_emails().await {
                        error!("Failed to show top emails: {}", e);
                    }
                }
                MenuAction::ShowEmailStats => {
                    if let Err(e) = self.show_email_stats().await {
                        error!("Failed to show stats: {}", e);
                    }
                }
                MenuAction::ClearCache => {
                    self.orchestrator.clear_cache().await;
                    println!("🗑️  Cached analysis cleared");
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Email Insight!");
                    break;
                }
            }
        }

        Ok(())
    }
}
