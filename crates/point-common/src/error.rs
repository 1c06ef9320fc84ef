//! Error types for point-data services.

use thiserror::Error;

/// Result type alias using PointDataError.
pub type PointDataResult<T> = Result<T, PointDataError>;

/// Primary error type for point-data operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PointDataError {
    // === Caller Errors ===
    #[error("Invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    // === Upstream Errors ===
    #[error("Upstream HTTP error {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    // === Data Consistency Errors ===
    #[error("Corner series lengths differ: {lengths:?}")]
    InconsistentSeriesLength { lengths: [usize; 4] },

    #[error("Corner series dates differ at index {index}")]
    MisalignedSeriesDates { index: usize },

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PointDataError {
    /// Create a validation error with a single message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Create an upstream error from a status and message.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamHttp {
            status,
            message: message.into(),
        }
    }

    /// Upstream answered with a body that does not match its schema.
    pub fn malformed_payload(service: &str, detail: impl std::fmt::Display) -> Self {
        Self::UpstreamHttp {
            status: 502,
            message: format!("{} API returned a malformed payload: {}", service, detail),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PointDataError::Validation(_) => 400,
            PointDataError::UpstreamHttp { status, .. } => *status,
            PointDataError::InconsistentSeriesLength { .. }
            | PointDataError::MisalignedSeriesDates { .. } => 502,
            PointDataError::Config(_) => 500,
        }
    }
}

impl From<serde_json::Error> for PointDataError {
    fn from(err: serde_json::Error) -> Self {
        PointDataError::malformed_payload("Upstream", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PointDataError::validation("bad x").http_status_code(), 400);
        assert_eq!(PointDataError::upstream(503, "down").http_status_code(), 503);
        assert_eq!(
            PointDataError::InconsistentSeriesLength {
                lengths: [5, 5, 4, 5]
            }
            .http_status_code(),
            502
        );
        assert_eq!(PointDataError::Config("x".into()).http_status_code(), 500);
    }

    #[test]
    fn test_validation_message_joins_all_problems() {
        let err = PointDataError::Validation(vec![
            "Parameter 'x' must be number".to_string(),
            "Parameter 'y' must be number".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid request: Parameter 'x' must be number; Parameter 'y' must be number"
        );
    }

    #[test]
    fn test_json_error_maps_to_bad_gateway() {
        let err: PointDataError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.http_status_code(), 502);
    }
}
