use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// JSON body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Store, filesystem or transport failure. Only `public` reaches the client.
    #[error("{public}: {source}")]
    Internal {
        public: &'static str,
        #[source]
        source: BoxError,
    },
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(public: &'static str, source: impl Into<BoxError>) -> Self {
        AppError::Internal {
            public,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(msg) | AppError::Forbidden(msg) | AppError::NotFound(msg) => {
                ErrorResponse::new(msg)
            }
            AppError::Internal { public, source } => {
                tracing::error!(error = %source, "{}", public);
                ErrorResponse::new(public)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Tags a fallible result with the generic message the client should see.
pub trait OrInternal<T> {
    fn or_internal(self, public: &'static str) -> Result<T, AppError>;
}

impl<T, E> OrInternal<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn or_internal(self, public: &'static str) -> Result<T, AppError> {
        self.map_err(|e| AppError::internal(public, e))
    }
}
