//! JSON surface used by the in-page share script.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::error::{ErrorReport, PreviewError};
use crate::domain::edits::Edit;

use super::HttpState;

const SOURCE: &str = "retouch::infra::http::api";

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const NOT_FOUND: &str = "not_found";
    pub const PERSIST_FAILED: &str = "persist_failed";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    /// Internal diagnostic for the logging middleware; never serialized.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            detail: None,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                codes::PAYLOAD_TOO_LARGE,
                "Request body too large",
                None,
            )
            .with_detail(detail);
        }
        Self::bad_request(
            "Expected a JSON array of edits",
            Some("Send [{\"id\": ..., \"innerText\": ...}]".to_string()),
        )
        .with_detail(detail)
    }
}

impl From<PreviewError> for ApiError {
    fn from(err: PreviewError) -> Self {
        let detail = err.to_string();
        match err {
            PreviewError::Validation(inner) => Self::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_INPUT,
                "Invalid edits",
                Some(inner.to_string()),
            ),
            PreviewError::NotFound { .. } => Self::new(
                StatusCode::NOT_FOUND,
                codes::NOT_FOUND,
                "Snapshot not found",
                None,
            ),
            PreviewError::PersistFailure { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                codes::PERSIST_FAILED,
                "Failed to store snapshot",
                Some("Try sharing again in a moment".to_string()),
            ),
            PreviewError::StoreUnavailable { .. } => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::STORE_UNAVAILABLE,
                "Snapshot store unavailable",
                None,
            ),
        }
        .with_detail(detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report_message = format!(
            "{}: {}",
            self.code,
            self.detail
                .as_deref()
                .or(self.hint.as_deref())
                .unwrap_or(self.message)
        );
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(SOURCE, self.status, report_message).attach(&mut response);
        response
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSnapshot {
    pub snapshot_id: String,
}

/// `POST /api/snapshots`
pub(super) async fn create_snapshot(
    State(state): State<HttpState>,
    payload: Result<Json<Vec<Edit>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(edits) = payload?;
    let snapshot = state.snapshots.create_snapshot(edits).await?;

    let snapshot_id = snapshot.id.as_str().to_string();
    let location = format!("/preview/{snapshot_id}");
    let mut response = (StatusCode::CREATED, Json(CreatedSnapshot { snapshot_id })).into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}
