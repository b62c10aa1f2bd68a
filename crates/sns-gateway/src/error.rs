//! Error types for the gateway.
//!
//! [`GatewayError`] converts into an Axum response with a JSON body of
//! the form `{error, code, reason, status}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sns_core::{ErrorKind, TimelineError};
use tracing::error;

/// Errors that can occur in the gateway layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A timeline operation failed.
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

impl GatewayError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Timeline(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                ErrorKind::Invalid => StatusCode::BAD_REQUEST,
                ErrorKind::Cancelled | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let Self::Timeline(e) = &self;
        if status.is_server_error() {
            error!(error = %e, "Request failed");
        }

        let body = serde_json::json!({
            "error": e.to_string(),
            "code": e.kind().code(),
            "reason": e.reason(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        let err = GatewayError::from(TimelineError::SelfFollow {
            username: "alice".to_owned(),
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_maps_to_400() {
        let err = GatewayError::from(TimelineError::Invalid("empty username".to_owned()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
