#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

use retouch::application::blob::{BlobStore, BlobStoreError, StoredObject};
use retouch::application::preview::enter_preview;
use retouch::application::snapshots::SnapshotService;
use retouch::infra::blob::MemoryBlobStore;
use retouch::infra::http::{HttpState, PREVIEW_COOKIE, PreviewCookies, build_router};

pub const SECRET: &str = "integration-test-preview-secret-0123456789";
pub const BODY_LIMIT: usize = 4096;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryBlobStore>,
    pub cookies: PreviewCookies,
}

pub fn preview_cookies() -> PreviewCookies {
    PreviewCookies::new(SECRET, false, Duration::from_secs(3600)).expect("preview cookies")
}

pub fn app() -> TestApp {
    let store = Arc::new(MemoryBlobStore::new());
    let router = router_with_store(store.clone());
    TestApp {
        router,
        store,
        cookies: preview_cookies(),
    }
}

pub fn router_with_store(store: Arc<dyn BlobStore>) -> Router {
    let snapshots = Arc::new(SnapshotService::new(store));
    build_router(HttpState::new(snapshots, preview_cookies(), BODY_LIMIT))
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .expect("request")
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.expect("collect body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    let text = body_to_string(body).await;
    serde_json::from_str(&text).expect("json body")
}

/// The preview cookie a browser would send after this response, if any.
///
/// `None` when the response does not touch the cookie; `Some(None)` when it
/// removes it.
pub fn preview_cookie_update(response: &Response<Body>) -> Option<Option<String>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{PREVIEW_COOKIE}=")))
        .map(|value| {
            let pair = value.split(';').next().unwrap_or_default().trim();
            let removed = pair == format!("{PREVIEW_COOKIE}=")
                || value.to_ascii_lowercase().contains("max-age=0");
            (!removed).then(|| pair.to_string())
        })
}

/// A valid, encrypted cookie naming `snapshot_id`, minted without the HTTP flow.
pub fn forge_valid_cookie(cookies: &PreviewCookies, snapshot_id: &str) -> String {
    let session = enter_preview(snapshot_id).expect("session");
    let response = cookies
        .store(PrivateCookieJar::new(cookies.key()), &session)
        .into_response();
    preview_cookie_update(&response)
        .flatten()
        .expect("cookie set")
}

/// Store whose writes always fail.
pub struct RejectingStore;

#[async_trait]
impl BlobStore for RejectingStore {
    async fn put(&self, _key: &str, _value: Bytes) -> Result<(), BlobStoreError> {
        Err(BlobStoreError::unavailable("SignatureDoesNotMatch"))
    }

    async fn get(&self, key: &str) -> Result<StoredObject, BlobStoreError> {
        Err(BlobStoreError::not_found(key))
    }
}

/// Store that is unreachable for both reads and writes.
pub struct UnreachableStore;

#[async_trait]
impl BlobStore for UnreachableStore {
    async fn put(&self, _key: &str, _value: Bytes) -> Result<(), BlobStoreError> {
        Err(BlobStoreError::unavailable("connection refused"))
    }

    async fn get(&self, _key: &str) -> Result<StoredObject, BlobStoreError> {
        Err(BlobStoreError::unavailable("connection refused"))
    }
}
