use axum::{
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::error::ErrorKind;
use crate::handlers::AnalysisHandler;
use crate::models::AnalyzeBody;

pub struct AppState {
    pub analysis_handler: Arc<AnalysisHandler>,
}

pub fn create_router(
    analysis_handler: Arc<AnalysisHandler>,
    static_dir: &str,
    max_body_bytes: usize,
) -> Router {
    let state = Arc::new(AppState { analysis_handler });

    Router::new()
        .route("/", get(root_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn analyze_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    // Parsed by hand so a malformed body gets the same `{ error }` shape as every other failure
    let payload: AnalyzeBody = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => {
            let err = ErrorKind::MalformedBody(e.to_string());
            log::warn!("⚠️ {}", err);
            return err.into_response();
        }
    };

    match state.analysis_handler.analyze(payload).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            if err.status_code().is_server_error() {
                log::error!("❌ Analysis failed: {}", err);
            } else {
                log::warn!("⚠️ Rejected request: {}", err);
            }
            err.into_response()
        }
    }
}

async fn root_handler() -> &'static str {
    "Food Analyzer - POST /analyze with {\"type\": \"image\"|\"text\", \"data\": ..., \"allergies\": ...}"
}

async fn health_check() -> &'static str {
    "OK"
}
