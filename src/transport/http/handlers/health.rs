use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Reports whether the storage engine can still be read.
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.storage.lock().await;
    let backend = storage.backend_name();

    match storage.all(None).await {
        Ok(objects) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(serde_json::json!({
                    "status": "ok",
                    "backend": backend,
                    "objects": objects.len(),
                })),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                success: false,
                data: Some(serde_json::json!({ "status": "unhealthy", "backend": backend })),
                error: Some(format!("storage read failed: {}", e)),
            }),
        )
            .into_response(),
    }
}
