use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::info;

use crate::application::error::{HttpError, PreviewError};
use crate::application::preview::{self, MISSING_PREVIEW_MESSAGE};
use crate::presentation::views::{PageTemplate, PageView, render_template_response};

use super::HttpState;

const SOURCE: &str = "retouch::infra::http::public";

/// `GET /`: the page, overlaid with the previewed snapshot when the cookie names one.
pub(super) async fn index(State(state): State<HttpState>, jar: PrivateCookieJar) -> Response {
    let session = state.cookies.read(&jar);
    let page = state.renderer.render(session.as_ref()).await;
    let previewing = page.is_preview();

    let mut response = render_template_response(
        PageTemplate {
            view: PageView::from(page),
        },
        StatusCode::OK,
    );
    if previewing {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    response
}

/// `GET /preview/{id}`: remember the snapshot in the cookie and go back to the page.
pub(super) async fn enter_preview(
    State(state): State<HttpState>,
    jar: PrivateCookieJar,
    Path(raw_id): Path<String>,
) -> Result<(PrivateCookieJar, Redirect), HttpError> {
    let session = preview::enter_preview(&raw_id).map_err(preview_error_to_http)?;

    state
        .snapshots
        .load_snapshot(&session.snapshot_id)
        .await
        .map_err(preview_error_to_http)?;

    info!(
        target = SOURCE,
        snapshot_id = %session.snapshot_id,
        "preview entered"
    );
    let jar = state.cookies.store(jar, &session);
    Ok((jar, Redirect::to("/")))
}

/// `GET|POST /preview/exit`. Idempotent.
pub(super) async fn exit_preview(
    State(state): State<HttpState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    (state.cookies.clear(jar), Redirect::to("/"))
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(super) async fn fallback() -> Response {
    HttpError::new(SOURCE, StatusCode::NOT_FOUND, "Not found", "no route matched").into_response()
}

fn preview_error_to_http(err: PreviewError) -> HttpError {
    match &err {
        PreviewError::Validation(_) => HttpError::from_error(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Invalid preview link",
            &err,
        ),
        PreviewError::NotFound { .. } => {
            HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, MISSING_PREVIEW_MESSAGE, &err)
        }
        PreviewError::StoreUnavailable { .. } | PreviewError::PersistFailure { .. } => {
            HttpError::from_error(
                SOURCE,
                StatusCode::SERVICE_UNAVAILABLE,
                "Preview temporarily unavailable",
                &err,
            )
        }
    }
}
