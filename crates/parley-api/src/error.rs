use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use parley_core::{CoreError, ErrorKind};
use parley_types::api::{ErrorBody, ErrorDetail};

/// A `CoreError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self.0.kind() {
            ErrorKind::Internal => "internal server error".to_string(),
            _ => self.0.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.kind() == ErrorKind::Internal {
            error!("Request failed: {}", self.0);
        }

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.0.kind().as_str().to_string(),
                message: self.user_message(),
            },
        };
        (self.status_code(), Json(body)).into_response()
    }
}
