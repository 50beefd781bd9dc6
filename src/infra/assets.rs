//! Embedded static asset serving.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, include_dir};
use mime_guess::Mime;

use crate::application::error::ErrorReport;

static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Serve an embedded asset such as `preview.js` or `site.css`.
pub async fn serve_static(path: Option<Path<String>>) -> Response {
    const SOURCE: &str = "retouch::infra::assets::serve_static";

    let captured = path.map(|Path(value)| value).unwrap_or_default();
    match resolve_asset(&captured) {
        Some((contents, mime)) => build_response(Bytes::from_static(contents), mime),
        None => {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, "Static asset not found")
                .attach(&mut response);
            response
        }
    }
}

fn resolve_asset(path: &str) -> Option<(&'static [u8], Mime)> {
    let candidate = path.trim_start_matches('/');

    // No traversal, no directory listings.
    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }

    let file = STATIC_ASSETS.get_file(candidate)?;
    let mime = mime_guess::from_path(candidate).first_or_octet_stream();
    Some((file.contents(), mime))
}

fn build_response(bytes: Bytes, mime: Mime) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    response
}
