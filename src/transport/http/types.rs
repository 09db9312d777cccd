use crate::storage::{Storage, StorageError};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared by every handler. The storage engine is built once at start-up
/// and injected here.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Mutex<Box<dyn Storage>>>,
}

impl AppState {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A storage failure while building a page.
#[derive(Debug)]
pub struct PageError(pub StorageError);

impl From<StorageError> for PageError {
    fn from(err: StorageError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "page rendering failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(crate::transport::http::render::error_page(
                "Storage is unavailable",
            )),
        )
            .into_response()
    }
}
