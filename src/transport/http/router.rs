use crate::transport::http::handlers::{health, pages, text};
use crate::transport::http::types::AppState;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Closes the storage session once the handler is done, on every exit path.
async fn close_storage_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if let Err(e) = state.storage.lock().await.close().await {
        tracing::warn!(error = %e, "failed to close storage session");
    }
    response
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(text::hello_handler))
        .route("/c/:text", get(text::c_handler))
        .route("/python", get(text::python_default_handler))
        .route("/python/:text", get(text::python_handler))
        .route("/number/:n", get(text::number_handler))
        .route("/number_template/:n", get(text::number_template_handler))
        .route("/number_odd_or_even/:n", get(text::number_odd_or_even_handler))
        .route("/states_list", get(pages::states_list_handler))
        .route("/cities_by_states", get(pages::cities_by_states_handler))
        .route("/states", get(pages::states_list_handler))
        .route("/states/:id", get(pages::state_handler))
        .route("/hbnb_filters", get(pages::hbnb_filters_handler))
        .route("/hbnb", get(pages::hbnb_handler))
        .route("/health", get(health::healthcheck_handler))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            close_storage_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// The router wrapped so that a trailing slash never changes which route matches.
pub fn create_app(app_state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(create_router(app_state))
}
