use dialoguer::{theme::ColorfulTheme, Input};

use crate::analysis::AnalysisError;
use crate::llm::LlmError;
use crate::models::{ChatMessage, CliApp, ExpertSession, Result};

impl CliApp {
    pub async fn run_chat(&self, session: &mut ExpertSession) -> Result<()> {
        println!("\n💬 Chat with the Email Marketing Expert");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if session.context.is_some() {
            println!("✅ Analysis context loaded. The expert can reference your email performance.");
        } else {
            println!("ℹ️  Run the analysis first for context-aware answers.");
        }
        println!("Type your question, or an empty line to go back.\n");

        loop {
            let question: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("You")
                .allow_empty(true)
                .interact_text()?;

            let question = question.trim().to_string();
            if question.is_empty() || question.eq_ignore_ascii_case("exit") {
                break;
            }

            println!("🤔 Expert is thinking...");
            match self
                .orchestrator
                .ask_expert(&question, &session.history, session.context.as_deref())
                .await
            {
                Ok(response) => {
                    println!("\n🧑‍💼 Expert:\n{}\n", response);
                    session.history.push(ChatMessage::user(question));
                    session.history.push(ChatMessage::assistant(response));
                }
                Err(AnalysisError::Generation(LlmError::DailyQuotaExhausted { limit })) => {
                    println!(
                        "\n⚠️  Daily limit of {} requests reached. The limit resets at 00:00 UTC.\n",
                        limit
                    );
                    break;
                }
                Err(e) => {
                    println!("\n⚠️  Error: {}\n", e);
                    break;
                }
            }
        }

        Ok(())
    }
}
