mod api;
mod middleware;
mod public;
mod session;

pub use session::{PREVIEW_COOKIE, PreviewCookies};

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware::from_fn,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;

use crate::application::preview::PageRenderer;
use crate::application::snapshots::SnapshotService;
use crate::infra::assets::serve_static;

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub snapshots: Arc<SnapshotService>,
    pub renderer: PageRenderer,
    pub cookies: PreviewCookies,
    pub share_body_limit: usize,
}

impl HttpState {
    pub fn new(
        snapshots: Arc<SnapshotService>,
        cookies: PreviewCookies,
        share_body_limit: usize,
    ) -> Self {
        Self {
            renderer: PageRenderer::new(snapshots.clone()),
            snapshots,
            cookies,
            share_body_limit,
        }
    }
}

impl FromRef<HttpState> for Key {
    fn from_ref(state: &HttpState) -> Self {
        state.cookies.key()
    }
}

pub fn build_router(state: HttpState) -> Router {
    let share_limit = DefaultBodyLimit::max(state.share_body_limit);

    Router::new()
        .route("/", get(public::index))
        .route(
            "/api/snapshots",
            post(api::create_snapshot).layer(share_limit),
        )
        .route(
            "/preview/exit",
            get(public::exit_preview).post(public::exit_preview),
        )
        .route("/preview/{id}", get(public::enter_preview))
        .route("/static/{*path}", get(serve_static))
        .route("/_health", get(public::health))
        .fallback(public::fallback)
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context))
        .with_state(state)
}
