use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlyerError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl FlyerError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        FlyerError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        FlyerError::NotFound(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        FlyerError::UpstreamUnavailable(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FlyerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            FlyerError::NotFound(_) => StatusCode::NOT_FOUND,
            FlyerError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
