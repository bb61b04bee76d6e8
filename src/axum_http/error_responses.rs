use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Maps a usecase error onto a JSON error body. Server errors keep their
/// detail out of the response.
pub fn error_response(status: StatusCode, message: String) -> Response {
    let message = if status.is_server_error() {
        "Internal server error".to_string()
    } else {
        message
    };

    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message,
    });

    (status, body).into_response()
}
