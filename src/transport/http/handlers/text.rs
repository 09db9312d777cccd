//! Plain routes that do not touch storage.

use crate::transport::http::render;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

fn with_spaces(text: &str) -> String {
    text.replace('_', " ")
}

/// Only unsigned integers match, anything else is a 404 like an unmatched route.
fn parse_number(raw: &str) -> Result<u64, StatusCode> {
    raw.parse::<u64>().map_err(|_| StatusCode::NOT_FOUND)
}

pub async fn hello_handler() -> &'static str {
    "Hello HBNB!"
}

pub async fn c_handler(Path(text): Path<String>) -> String {
    format!("C {}", with_spaces(&text))
}

pub async fn python_default_handler() -> String {
    format!("Python {}", with_spaces("is_cool"))
}

pub async fn python_handler(Path(text): Path<String>) -> String {
    format!("Python {}", with_spaces(&text))
}

pub async fn number_handler(Path(raw): Path<String>) -> Response {
    match parse_number(&raw) {
        Ok(n) => format!("{} is a number", n).into_response(),
        Err(status) => status.into_response(),
    }
}

pub async fn number_template_handler(Path(raw): Path<String>) -> Response {
    match parse_number(&raw) {
        Ok(n) => Html(render::number_page(n)).into_response(),
        Err(status) => status.into_response(),
    }
}

pub async fn number_odd_or_even_handler(Path(raw): Path<String>) -> Response {
    match parse_number(&raw) {
        Ok(n) => Html(render::odd_or_even_page(n)).into_response(),
        Err(status) => status.into_response(),
    }
}
