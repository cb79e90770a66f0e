use crate::database::{fetch_email_records, get_message_stats};
use crate::server::ServerState;
use rocket::{delete, get, post, serde::json::Json, State};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Deserialize)]
pub struct AnalysisRequest {
    pub force_refresh: Option<bool>,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub report: String,
    pub context_summary: String,
    pub from_cache: bool,
    pub record_count: usize,
}

#[post("/analysis", data = "<request>")]
pub async fn run_analysis(
    state: &State<ServerState>,
    request: Json<AnalysisRequest>,
) -> Json<ApiResponse<AnalysisResponse>> {
    let _guard = state.run_lock.lock().await;

    let records = match fetch_email_records(
        &state.db_pool,
        &state.config.analysis.target_ids,
    )
    .await
    {
        Ok(records) => records,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };
    let record_count = records.len();

    match state
        .orchestrator
        .run_analysis(
            &records,
            request.force_refresh.unwrap_or(false),
            state.config.analysis.batch_size,
        )
        .await
    {
        Ok(outcome) => Json(ApiResponse::success(AnalysisResponse {
            report: outcome.report,
            context_summary: outcome.context_summary,
            from_cache: outcome.from_cache,
            record_count,
        })),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}

#[delete("/cache")]
pub async fn clear_cache(state: &State<ServerState>) -> Json<ApiResponse<String>> {
    let _guard = state.run_lock.lock().await;
    state.orchestrator.clear_cache().await;
    Json(ApiResponse::success("cache cleared".to_string()))
}

#[derive(Serialize)]
pub struct EmailStatsResponse {
    pub total_messages: i64,
    pub messages_with_sends: i64,
    pub total_sent: i64,
    pub total_opened: i64,
    pub total_clicked: i64,
    pub total_unsubscribed: i64,
}

#[get("/stats/email")]
pub async fn get_email_stats(
    state: &State<ServerState>,
) -> Json<ApiResponse<EmailStatsResponse>> {
    match get_message_stats(&state.db_pool).await {
        Ok(stats) => Json(ApiResponse::success(EmailStatsResponse {
            total_messages: stats.total_messages,
            messages_with_sends: stats.messages_with_sends,
            total_sent: stats.total_sent,
            total_opened: stats.total_opened,
            total_clicked: stats.total_clicked,
            total_unsubscribed: stats.total_unsubscribed,
        })),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}
