//! Request handlers and the response helpers they share.

pub mod home;
pub mod listings;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

/// What every route handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

pub fn boxed(fut: impl Future<Output = Response> + Send + 'static) -> HandlerFuture {
    Box::pin(fut)
}

pub fn json(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

pub fn error_page(status: StatusCode, message: &str) -> Response {
    json(
        status,
        json!({ "status": status.as_u16(), "message": message }),
    )
}

pub fn not_found(message: &str) -> Response {
    error_page(StatusCode::NOT_FOUND, message)
}

/// 303 See Other, so a browser follows a form POST with a GET.
pub fn redirect(to: &str) -> Response {
    Redirect::to(to).into_response()
}

pub fn database_error(err: jobboard::Error) -> Response {
    tracing::error!(error = %err, "database error");
    error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
