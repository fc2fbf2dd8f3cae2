//! Error types for the journal API

use std::any::Any;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use journal_core::{Error as CoreError, INVALID_CREDENTIALS};
use thiserror::Error;

use crate::models::MessageResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Conflict(_) => StatusCode::CONFLICT,
                CoreError::InvalidCredentials
                | CoreError::MissingToken
                | CoreError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
                CoreError::Forbidden => StatusCode::FORBIDDEN,
                CoreError::NotFound => StatusCode::NOT_FOUND,
                CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to show a client
    fn public_message(&self) -> String {
        match self {
            ApiError::InvalidBody(_) => "Invalid request body".to_string(),
            ApiError::InvalidQuery(_) => "Invalid query string".to_string(),
            ApiError::Core(err) => match err {
                CoreError::Validation(msg) | CoreError::Conflict(msg) => msg.clone(),
                CoreError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
                CoreError::MissingToken => "Unauthorized: No token provided".to_string(),
                CoreError::InvalidToken(_) => "Unauthorized: Invalid or expired token".to_string(),
                CoreError::Forbidden => "Forbidden: you do not own this journal".to_string(),
                CoreError::NotFound => "Journal not found".to_string(),
                CoreError::Internal(_) => "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Core(CoreError::Internal(detail)) => {
                tracing::error!("Internal error: {}", detail);
            }
            ApiError::InvalidBody(detail) => {
                tracing::debug!("Rejected request body: {}", detail);
            }
            ApiError::InvalidQuery(detail) => {
                tracing::debug!("Rejected query string: {}", detail);
            }
            _ => {}
        }

        let status = self.status();
        let body = MessageResponse {
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Turn a handler panic into the generic 500 body
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::from(CoreError::internal(format!("Handler panicked: {}", detail))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::validation("x"), StatusCode::BAD_REQUEST),
            (CoreError::Conflict("x".into()), StatusCode::CONFLICT),
            (CoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CoreError::MissingToken, StatusCode::UNAUTHORIZED),
            (CoreError::InvalidToken("x".into()), StatusCode::UNAUTHORIZED),
            (CoreError::Forbidden, StatusCode::FORBIDDEN),
            (CoreError::NotFound, StatusCode::NOT_FOUND),
            (CoreError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = ApiError::from(CoreError::internal("store corrupted at 0xdeadbeef"));
        assert_eq!(err.public_message(), "Internal server error");

        let err = ApiError::from(CoreError::InvalidToken("Invalid signature".into()));
        assert!(!err.public_message().contains("signature"));
    }

    #[test]
    fn test_query_rejection_is_a_generic_400() {
        let err = ApiError::InvalidQuery("Failed to deserialize query string: duplicate field `query`".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid query string");
    }

    #[test]
    fn test_panic_maps_to_internal_error() {
        let response = handle_panic(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_panic(Box::new(String::from("owned message")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_panic(Box::new(42u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
