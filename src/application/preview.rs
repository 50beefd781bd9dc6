//! Preview sessions and per-request page rendering.

use std::sync::Arc;

use metrics::counter;
use tracing::warn;

use crate::application::error::PreviewError;
use crate::application::snapshots::SnapshotService;
use crate::domain::page::PageContent;
use crate::domain::snapshots::SnapshotId;

const SOURCE: &str = "retouch::application::preview";

pub const MISSING_PREVIEW_MESSAGE: &str = "The requested preview does not exist.";
pub const UNAVAILABLE_PREVIEW_MESSAGE: &str =
    "The preview could not be loaded right now. Showing the default page instead.";

/// The state carried by a preview cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSession {
    pub snapshot_id: SnapshotId,
}

/// Start previewing `raw_id`.
///
/// Only the shape of the id is checked here; whether the snapshot exists is
/// discovered when the page renders.
pub fn enter_preview(raw_id: &str) -> Result<PreviewSession, PreviewError> {
    let snapshot_id = SnapshotId::parse(raw_id)?;
    Ok(PreviewSession { snapshot_id })
}

/// How a request was rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    Normal,
    Preview {
        snapshot_id: SnapshotId,
    },
    /// Preview was requested but the snapshot could not be shown.
    Degraded {
        snapshot_id: SnapshotId,
        reason: DegradedReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedReason {
    Missing,
    Unavailable,
}

impl DegradedReason {
    pub fn message(self) -> &'static str {
        match self {
            DegradedReason::Missing => MISSING_PREVIEW_MESSAGE,
            DegradedReason::Unavailable => UNAVAILABLE_PREVIEW_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub mode: RenderMode,
    pub content: PageContent,
}

impl RenderedPage {
    pub fn banner(&self) -> Option<&'static str> {
        match &self.mode {
            RenderMode::Degraded { reason, .. } => Some(reason.message()),
            _ => None,
        }
    }

    pub fn is_preview(&self) -> bool {
        !matches!(self.mode, RenderMode::Normal)
    }
}

/// Chooses between Normal and Preview for each request.
#[derive(Clone)]
pub struct PageRenderer {
    snapshots: Arc<SnapshotService>,
}

impl PageRenderer {
    pub fn new(snapshots: Arc<SnapshotService>) -> Self {
        Self { snapshots }
    }

    /// Never fails: store problems degrade to default content with a banner.
    pub async fn render(&self, session: Option<&PreviewSession>) -> RenderedPage {
        let Some(session) = session else {
            counter!("retouch_preview_renders_total", "outcome" => "normal").increment(1);
            return RenderedPage {
                mode: RenderMode::Normal,
                content: PageContent::defaults(),
            };
        };

        let snapshot_id = session.snapshot_id.clone();
        match self.snapshots.load_snapshot(&snapshot_id).await {
            Ok(snapshot) => {
                counter!("retouch_preview_renders_total", "outcome" => "preview").increment(1);
                RenderedPage {
                    mode: RenderMode::Preview { snapshot_id },
                    content: PageContent::overlay(&snapshot.edits),
                }
            }
            Err(err) => {
                let reason = match err {
                    PreviewError::NotFound { .. } | PreviewError::Validation(_) => {
                        DegradedReason::Missing
                    }
                    PreviewError::StoreUnavailable { .. } | PreviewError::PersistFailure { .. } => {
                        DegradedReason::Unavailable
                    }
                };
                counter!("retouch_preview_renders_total", "outcome" => "degraded").increment(1);
                warn!(
                    target = SOURCE,
                    snapshot_id = %snapshot_id,
                    error = %err,
                    "preview render degraded"
                );
                RenderedPage {
                    mode: RenderMode::Degraded {
                        snapshot_id,
                        reason,
                    },
                    content: PageContent::defaults(),
                }
            }
        }
    }
}
