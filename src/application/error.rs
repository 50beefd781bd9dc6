use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{domain::error::DomainError, infra::error::InfraError};

/// Diagnostic detail attached to a response for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Plain-text error response for the HTML surface.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Failures surfaced by the snapshot and preview services.
///
/// Blob store errors are translated into these kinds before they leave the
/// application layer; provider messages only travel in `detail`.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("snapshot `{id}` not found")]
    NotFound { id: String },
    #[error("snapshot store unavailable: {detail}")]
    StoreUnavailable { detail: String },
    #[error("failed to persist snapshot: {detail}")]
    PersistFailure { detail: String },
    #[error(transparent)]
    Validation(#[from] DomainError),
}

impl PreviewError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn store_unavailable(detail: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            detail: detail.into(),
        }
    }

    pub fn persist_failure(detail: impl Into<String>) -> Self {
        Self::PersistFailure {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_source_chain() {
        let inner = std::io::Error::other("socket closed");
        let err = InfraError::Io(inner);
        let report = ErrorReport::from_error("test", StatusCode::BAD_GATEWAY, &err);

        assert_eq!(report.messages.len(), 2);
        assert!(report.messages[0].starts_with("io error"));
        assert_eq!(report.messages[1], "socket closed");
    }

    #[test]
    fn http_error_attaches_report() {
        let response = HttpError::new(
            "test",
            StatusCode::NOT_FOUND,
            "Preview not found",
            "snapshot `x` not found",
        )
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.messages, vec!["snapshot `x` not found".to_string()]);
    }
}
