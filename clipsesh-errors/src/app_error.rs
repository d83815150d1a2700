use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Too many requests, retry in {0}s")]
    TooManyRequests(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn internal(err: impl Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    /// Message safe to hand back to a client. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal Server Error".to_string(),
            Self::TooManyRequests(_) => {
                "Too many search requests from this IP, please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "axum")]
mod http_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        error: String,
    }

    impl AppError {
        pub fn status(&self) -> StatusCode {
            match self {
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            if let AppError::Internal(detail) = &self {
                tracing::error!("Request failed: {}", detail);
            }
            let body = ErrorResponse {
                error: self.user_message(),
            };
            (self.status(), Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_details_are_hidden() {
        let err = AppError::internal("connection refused on 10.0.0.3:5432");
        assert_eq!(err.user_message(), "Internal Server Error");
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(AppError::not_found("Post").user_message(), "Post not found");
    }

    #[cfg(feature = "axum")]
    #[test]
    fn maps_taxonomy_to_status_codes() {
        use axum::http::StatusCode;

        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::TooManyRequests(3).status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
