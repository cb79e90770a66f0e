use crate::api::analysis::ApiResponse;
use crate::models::ChatMessage;
use crate::server::ServerState;
use rocket::{post, serde::json::Json, State};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub context: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[post("/chat", data = "<request>")]
pub async fn ask_expert(
    state: &State<ServerState>,
    request: Json<ChatRequest>,
) -> Json<ApiResponse<ChatResponse>> {
    match state
        .orchestrator
        .ask_expert(
            &request.question,
            &request.history,
            request.context.as_deref(),
        )
        .await
    {
        Ok(answer) => Json(ApiResponse::success(ChatResponse { answer })),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}

#[derive(Deserialize)]
pub struct CritiqueRequest {
    pub content: String,
    pub subject: Option<String>,
}

#[post("/critique", data = "<request>")]
pub async fn critique_email(
    state: &State<ServerState>,
    request: Json<CritiqueRequest>,
) -> Json<ApiResponse<ChatResponse>> {
    match state
        .orchestrator
        .critique_email(&request.content, request.subject.as_deref())
        .await
    {
        Ok(answer) => Json(ApiResponse::success(ChatResponse { answer })),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}
