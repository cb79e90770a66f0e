use crate::analysis::AnalysisOrchestrator;
use crate::api::*;
use crate::config::Config;
use crate::database::DbPool;
use rocket::{routes, Build, Rocket};
use tokio::sync::Mutex;

pub mod routes;

pub struct ServerState {
    pub config: Config,
    pub db_pool: DbPool,
    pub orchestrator: AnalysisOrchestrator,
    // One analysis run (or cache clear) at a time; the cache file has a
    // single writer.
    pub run_lock: Mutex<()>,
}

pub fn build_rocket(
    config: Config,
    db_pool: DbPool,
    orchestrator: AnalysisOrchestrator,
) -> Rocket<Build> {
    let state = ServerState {
        config,
        db_pool,
        orchestrator,
        run_lock: Mutex::new(()),
    };

    rocket::build().manage(state).mount(
        "/api",
        routes![
            routes::health::health_check,
            routes::health::index,
            run_analysis,
            clear_cache,
            get_email_stats,
            ask_expert,
            critique_email,
        ],
    )
}
