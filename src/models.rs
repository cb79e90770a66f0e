use serde::{Deserialize, Serialize};

use crate::{analysis::AnalysisOrchestrator, config::Config, database::DbPool};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub subject: String,
    pub plaintext: String,
    pub message_body: String,
    pub sent: i64,
    pub opened: i64,
    pub clicked: i64,
    pub unsubscribed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// Conversation state is threaded explicitly through every operation;
// nothing in the core reads ambient globals.
#[derive(Debug, Default)]
pub struct ExpertSession {
    pub history: Vec<ChatMessage>,
    pub context: Option<String>,
}

pub struct CliApp {
    pub config: Config,
    pub db_pool: DbPool,
    pub orchestrator: AnalysisOrchestrator,
}
