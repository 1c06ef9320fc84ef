//! Error bodies and query parsing shared by the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use point_common::PointDataError;
use serde::Serialize;
use tracing::error;

/// `{"error": ...}`; validation may report several problems at once.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorMessage,
}

pub fn error_response(status: StatusCode, error: ErrorMessage) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, ErrorMessage::One(message.into()))
}

/// Map a domain error onto a JSON error response.
pub fn point_data_error_response(err: PointDataError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::BAD_GATEWAY);

    match err {
        PointDataError::Validation(mut messages) => {
            let message = if messages.len() == 1 {
                ErrorMessage::One(messages.remove(0))
            } else {
                ErrorMessage::Many(messages)
            };
            error_response(StatusCode::BAD_REQUEST, message)
        }
        PointDataError::UpstreamHttp { message, .. } => {
            error!(status = status.as_u16(), "{}", message);
            error_response(status, ErrorMessage::One(message))
        }
        PointDataError::Config(ref message) => {
            error!("Configuration error while serving request: {}", message);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorMessage::One("Internal server error".to_string()),
            )
        }
        other => {
            error!("{}", other);
            error_response(status, ErrorMessage::One(other.to_string()))
        }
    }
}

/// A query value that was given and is not blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a numeric query value, recording a message on failure.
pub fn parse_number(name: &str, value: &str, errors: &mut Vec<String>) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            errors.push(format!("Parameter '{}' must be number", name));
            None
        }
    }
}
