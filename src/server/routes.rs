pub mod health {
    use rocket::{get, serde::json::Json};
    use serde_json::{json, Value};

    #[get("/health")]
    pub async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "email-insight-api"
        }))
    }

    #[get("/")]
    pub async fn index() -> Json<Value> {
        Json(json!({
            "name": "Email Insight API",
            "version": "0.1.0",
            "description": "API for AI-assisted marketing email analysis",
            "endpoints": {
                "health": "/api/health",
                "analysis": "POST /api/analysis",
                "cache": "DELETE /api/cache",
                "stats": "/api/stats/email",
                "chat": "POST /api/chat",
                "critique": "POST /api/critique"
            }
        }))
    }
}
