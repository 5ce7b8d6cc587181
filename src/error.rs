//! The request-level error type. This is the only place that decides what a
//! failure looks like to a visitor, and the only place failures are logged.

use crate::entry::TimestampError;
use crate::{feed, render, store};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Everything a request handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failed store lookup.
    #[error(transparent)]
    Store(#[from] store::Error),

    /// A non-numeric id where an entry id was expected.
    #[error("invalid entry id `{0}`")]
    InvalidIdentifier(String),

    /// A rejected feed request or a feed that failed to serialize.
    #[error(transparent)]
    Feed(#[from] feed::Error),

    /// A template that failed to execute.
    #[error(transparent)]
    Render(#[from] render::Error),

    /// A stored entry whose id is not a usable date.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// The status code and the plain-text body sent for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Store(store::Error::NotFound { kind, key }) => {
                (StatusCode::NOT_FOUND, format!("no {kind} `{key}`."))
            }
            AppError::InvalidIdentifier(id) => {
                (StatusCode::BAD_REQUEST, format!("invalid entry id `{id}`."))
            }
            AppError::Feed(feed::Error::MissingType) => (
                StatusCode::PRECONDITION_REQUIRED,
                "no feed type specified by user.".to_owned(),
            ),
            AppError::Feed(feed::Error::InvalidType(_)) => (
                StatusCode::PRECONDITION_FAILED,
                "invalid type requested by user.".to_owned(),
            ),
            AppError::Store(store::Error::Unavailable { .. })
            | AppError::Feed(_)
            | AppError::Render(_)
            | AppError::Timestamp(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "an internal error occurred.".to_owned(),
            ),
        }
    }

    fn log(&self) {
        match self {
            AppError::Store(store::Error::Unavailable { query, key, source }) => {
                tracing::error!(query, key = %key, error = %source, "Store query failed");
            }
            AppError::Store(err @ store::Error::NotFound { .. }) => {
                tracing::info!(error = %err, "Not found");
            }
            AppError::InvalidIdentifier(_)
            | AppError::Feed(feed::Error::MissingType)
            | AppError::Feed(feed::Error::InvalidType(_)) => {
                tracing::warn!(error = %self, "Rejected request");
            }
            AppError::Feed(err) => tracing::error!(error = %err, "Failed to create feed"),
            AppError::Render(err) => tracing::error!(error = %err, "Failed to render page"),
            AppError::Timestamp(err) => tracing::error!(error = %err, "Stored entry has a bad id"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        self.status_and_message().into_response()
    }
}
