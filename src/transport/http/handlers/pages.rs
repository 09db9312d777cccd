//! Pages built from storage. Each one takes the engine lock for the length of
//! the request; the session is closed afterwards by the router middleware.

use crate::app::listings;
use crate::transport::http::render;
use crate::transport::http::types::{AppState, PageError};
use axum::extract::{Path, State};
use axum::response::Html;

pub async fn states_list_handler(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let storage = state.storage.lock().await;
    let states = listings::states(storage.as_ref()).await?;
    Ok(Html(render::states_list_page(&states)))
}

pub async fn cities_by_states_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let storage = state.storage.lock().await;
    let states = listings::states_with_cities(storage.as_ref()).await?;
    Ok(Html(render::cities_by_states_page(&states)))
}

pub async fn state_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let storage = state.storage.lock().await;
    let found = listings::state_with_cities(storage.as_ref(), &id).await?;
    Ok(Html(render::state_page(found.as_ref())))
}

pub async fn hbnb_filters_handler(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let storage = state.storage.lock().await;
    let states = listings::states_with_cities(storage.as_ref()).await?;
    let amenities = listings::amenities(storage.as_ref()).await?;
    Ok(Html(render::filters_page(&states, &amenities)))
}

pub async fn hbnb_handler(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let storage = state.storage.lock().await;
    let states = listings::states_with_cities(storage.as_ref()).await?;
    let amenities = listings::amenities(storage.as_ref()).await?;
    let places = listings::places(storage.as_ref()).await?;
    Ok(Html(render::hbnb_page(&states, &amenities, &places)))
}
