mod support;

use std::sync::Arc;

use axum::http::{StatusCode, header};

use retouch::application::preview::{MISSING_PREVIEW_MESSAGE, UNAVAILABLE_PREVIEW_MESSAGE};
use support::*;

async fn share(app: &TestApp, body: &str) -> String {
    let response = send(&app.router, post_json("/api/snapshots", body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    json["snapshotId"]
        .as_str()
        .expect("snapshot id in response")
        .to_string()
}

async fn enter(app: &TestApp, snapshot_id: &str) -> String {
    let response = send(&app.router, get(&format!("/preview/{snapshot_id}"), None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.as_bytes()),
        Some(&b"/"[..])
    );
    preview_cookie_update(&response)
        .flatten()
        .expect("preview cookie set")
}

async fn page(app: &TestApp, cookie: Option<&str>) -> (StatusCode, String) {
    let response = send(&app.router, get("/", cookie)).await;
    let status = response.status();
    (status, body_to_string(response.into_body()).await)
}

#[tokio::test]
async fn shared_edits_round_trip_into_preview() {
    let app = app();

    let snapshot_id = share(&app, r#"[{"id":"title","innerText":"Hello"}]"#).await;

    let stored = app
        .store
        .object(&format!("{snapshot_id}.json"))
        .expect("snapshot stored under <id>.json");
    let stored: serde_json::Value = serde_json::from_slice(&stored).expect("stored json");
    assert_eq!(
        stored,
        serde_json::json!([{ "id": "title", "innerText": "Hello" }])
    );

    let cookie = enter(&app, &snapshot_id).await;
    let response = send(&app.router, get("/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.as_bytes()),
        Some(&b"no-store"[..])
    );
    let html = body_to_string(response.into_body()).await;

    assert!(html.contains(">Hello<"));
    assert!(html.contains(&snapshot_id));
    assert!(html.contains("Edit any highlighted text in place"));
    assert!(!html.contains("Make the page your own</h1>"));
}

#[tokio::test]
async fn empty_batch_previews_default_content() {
    let app = app();
    let (_, fresh) = page(&app, None).await;

    let snapshot_id = share(&app, "[]").await;
    let cookie = enter(&app, &snapshot_id).await;
    let (status, html) = page(&app, Some(&cookie)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Make the page your own</h1>"));
    assert!(html.contains(&snapshot_id));
    assert_ne!(html, fresh);
}

#[tokio::test]
async fn exiting_preview_restores_the_fresh_page() {
    let app = app();
    let (_, fresh) = page(&app, None).await;

    let snapshot_id = share(&app, r#"[{"id":"cta","innerText":"Changed"}]"#).await;
    let cookie = enter(&app, &snapshot_id).await;

    let response = send(&app.router, get("/preview/exit", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(preview_cookie_update(&response), Some(None));

    let (status, html) = page(&app, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, fresh);
}

#[tokio::test]
async fn exit_without_preview_is_harmless() {
    let app = app();

    let response = send(
        &app.router,
        axum::http::Request::post("/preview/exit")
            .body(axum::body::Body::empty())
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn unknown_snapshot_is_not_found() {
    let app = app();

    let response = send(&app.router, get("/preview/does-not-exist", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(preview_cookie_update(&response), None);
    let body = body_to_string(response.into_body()).await;
    assert_eq!(body, MISSING_PREVIEW_MESSAGE);
}

#[tokio::test]
async fn malformed_snapshot_id_is_bad_request() {
    let app = app();

    let response = send(&app.router, get("/preview/not%20an%20id", None)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preview_of_vanished_snapshot_shows_banner() {
    let app = app();
    let cookie = forge_valid_cookie(&app.cookies, "vanished");

    let (status, html) = page(&app, Some(&cookie)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(MISSING_PREVIEW_MESSAGE));
    assert!(html.contains("Make the page your own</h1>"));
}

#[tokio::test]
async fn unreachable_store_degrades_preview() {
    let router = router_with_store(Arc::new(UnreachableStore));
    let cookie = forge_valid_cookie(&preview_cookies(), "abc123");

    let response = send(&router, get("/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains(UNAVAILABLE_PREVIEW_MESSAGE));

    let response = send(&router, get("/preview/abc123", None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn tampered_cookie_renders_the_normal_page() {
    let app = app();
    let (_, fresh) = page(&app, None).await;

    let snapshot_id = share(&app, r#"[{"id":"title","innerText":"Hello"}]"#).await;
    let cookie = enter(&app, &snapshot_id).await;
    let position = cookie.find('=').expect("cookie pair") + 8;
    let original = cookie.as_bytes()[position];
    let replacement = if original == b'A' { "B" } else { "A" };
    let mut tampered = cookie.clone();
    tampered.replace_range(position..position + 1, replacement);

    let (_, html) = page(&app, Some(&tampered)).await;
    assert_eq!(html, fresh);

    let (_, plaintext) =
        page(&app, Some(&format!("retouch_preview={snapshot_id}"))).await;
    assert_eq!(plaintext, fresh);
}

#[tokio::test]
async fn invalid_batches_are_rejected_without_writing() {
    let app = app();

    let duplicate = send(
        &app.router,
        post_json(
            "/api/snapshots",
            r#"[{"id":"title","innerText":"a"},{"id":"title","innerText":"b"}]"#,
        ),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(duplicate.into_body()).await;
    assert_eq!(body["error"]["code"], "invalid_input");

    let malformed = send(
        &app.router,
        post_json("/api/snapshots", r#"{"id":"title"}"#),
    )
    .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(malformed.into_body()).await;
    assert_eq!(body["error"]["code"], "bad_request");

    assert_eq!(app.store.put_count(), 0);
}

#[tokio::test]
async fn oversized_share_is_rejected() {
    let app = app();
    let text = "x".repeat(BODY_LIMIT * 2);
    let body = format!(r#"[{{"id":"intro","innerText":"{text}"}}]"#);

    let response = send(&app.router, post_json("/api/snapshots", body)).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.store.put_count(), 0);
}

#[tokio::test]
async fn persist_failure_is_bad_gateway() {
    let router = router_with_store(Arc::new(RejectingStore));

    let response = send(
        &router,
        post_json("/api/snapshots", r#"[{"id":"title","innerText":"Hello"}]"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "persist_failed");
    assert!(body.get("snapshotId").is_none());
    assert!(!body.to_string().contains("SignatureDoesNotMatch"));
}
