use dialoguer::{theme::ColorfulTheme, Input};

use crate::models::{ChatMessage, CliApp, ExpertSession, Result};

impl CliApp {
    pub async fn run_critique(&self, session: &mut ExpertSession) -> Result<()> {
        println!("\n📝 Critique a Specific Email");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("Paste an email draft to get improvement recommendations.\n");

        let subject: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Subject line (optional)")
            .allow_empty(true)
            .interact_text()?;

        let content: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Email content")
            .interact_text()?;

        if content.trim().is_empty() {
            println!("⚠️  Nothing to analyze: no content entered.");
            return Ok(());
        }

        let subject = subject.trim();
        let subject_opt = (!subject.is_empty()).then_some(subject);

        println!("🔍 Analyzing email and generating recommendations...");
        let recommendations = self
            .orchestrator
            .critique_email(content.trim(), subject_opt)
            .await?;

        println!("\n🧑‍💼 Recommendations:\n{}\n", recommendations);

        // Keep the exchange in the conversation so follow-up questions in
        // chat mode can reference it.
        session.history.push(ChatMessage::user(format!(
            "Please analyze this email:\n\nSubject: {}\n\nContent:\n{}",
            subject_opt.unwrap_or("N/A"),
            content.trim()
        )));
        session
            .history
            .push(ChatMessage::assistant(recommendations));

        println!("✅ Critique added to the chat history.");

        Ok(())
    }
}
