//! Creating and loading edit snapshots.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use metrics::counter;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::application::blob::{BlobStore, BlobStoreError};
use crate::application::error::PreviewError;
use crate::domain::edits::{Edit, EditableRegion, capture_edits, validate_batch};
use crate::domain::snapshots::{Snapshot, SnapshotId};

const SOURCE: &str = "retouch::application::snapshots";

#[derive(Clone)]
pub struct SnapshotService {
    store: Arc<dyn BlobStore>,
}

impl SnapshotService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Persist `edits` under a freshly minted id and return that id.
    ///
    /// The id is only handed out after the write succeeds, so a failed put
    /// never leaves a reachable snapshot behind.
    pub async fn create_snapshot(&self, edits: Vec<Edit>) -> Result<Snapshot, PreviewError> {
        validate_batch(&edits)?;

        let id = SnapshotId::generate();
        let payload = serde_json::to_vec(&edits)
            .map_err(|err| PreviewError::persist_failure(format!("serialize edits: {err}")))?;

        if let Err(err) = self.store.put(&id.blob_key(), Bytes::from(payload)).await {
            counter!("retouch_snapshot_persist_failures_total").increment(1);
            warn!(
                target = SOURCE,
                snapshot_id = %id,
                error = %err,
                "failed to persist snapshot"
            );
            return Err(PreviewError::persist_failure(err.to_string()));
        }

        counter!("retouch_snapshots_created_total").increment(1);
        info!(
            target = SOURCE,
            snapshot_id = %id,
            edits = edits.len(),
            "snapshot created"
        );

        Ok(Snapshot {
            id,
            edits,
            created_at: Some(OffsetDateTime::now_utc()),
        })
    }

    pub async fn load_snapshot(&self, id: &SnapshotId) -> Result<Snapshot, PreviewError> {
        let object = self
            .store
            .get(&id.blob_key())
            .await
            .map_err(|err| match err {
                BlobStoreError::NotFound { .. } => PreviewError::not_found(id.as_str()),
                BlobStoreError::Unavailable { message } => PreviewError::store_unavailable(message),
            })?;

        let edits: Vec<Edit> = serde_json::from_slice(&object.bytes).map_err(|err| {
            warn!(
                target = SOURCE,
                snapshot_id = %id,
                error = %err,
                "stored snapshot could not be parsed"
            );
            PreviewError::store_unavailable(format!("corrupt snapshot payload: {err}"))
        })?;

        Ok(Snapshot {
            id: id.clone(),
            edits,
            created_at: object.last_modified,
        })
    }
}

/// Result of a share request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared(SnapshotId),
    /// Another share was still outstanding; nothing was written.
    Suppressed,
}

/// Single-flight wrapper around snapshot creation.
///
/// While one share is outstanding further shares are dropped, not queued.
pub struct ShareAction {
    snapshots: Arc<SnapshotService>,
    in_flight: AtomicBool,
}

impl ShareAction {
    pub fn new(snapshots: Arc<SnapshotService>) -> Self {
        Self {
            snapshots,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn share(&self, regions: &[EditableRegion]) -> Result<ShareOutcome, PreviewError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(ShareOutcome::Suppressed);
        }
        let _release = InFlightGuard(&self.in_flight);

        let edits = capture_edits(regions);
        let snapshot = self.snapshots.create_snapshot(edits).await?;
        Ok(ShareOutcome::Shared(snapshot.id))
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
