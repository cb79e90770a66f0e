use tracing::info;

use crate::analysis::AnalysisOrchestrator;
use crate::config::Config;
use crate::database::DbPool;
use crate::models::CliApp;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub enum MenuAction {
    RunAnalysis,
    ForceReanalyze,
    ChatWithExpert,
    CritiqueEmail,
    ShowTopEmails,
    ShowEmailStats,
    ClearCache,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::RunAnalysis => {
                write!(f, "📊 Analyze all emails (cached when data is unchanged)")
            }
            MenuAction::ForceReanalyze => {
                write!(f, "🔄 Re-run the full analysis (ignore cache)")
            }
            MenuAction::ChatWithExpert => {
                write!(f, "💬 Chat with the email marketing expert")
            }
            MenuAction::CritiqueEmail => {
                write!(f, "📝 Critique a specific email draft")
            }
            MenuAction::ShowTopEmails => {
                write!(f, "🏆 Show top and worst performing emails")
            }
            MenuAction::ShowEmailStats => write!(f, "📈 Show email database statistics"),
            MenuAction::ClearCache => write!(f, "🗑️  Clear the cached analysis"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

impl CliApp {
    pub async fn new(config: Config, db_pool: DbPool) -> Result<Self> {
        // A missing API key is fatal here, before any menu is shown.
        let orchestrator = AnalysisOrchestrator::from_config(&config)?;

        info!("Analysis orchestrator ready (batch size {})", config.analysis.batch_size);

        Ok(Self {
            config,
            db_pool,
            orchestrator,
        })
    }
}
