use std::fmt;

use time::OffsetDateTime;
use uuid::Uuid;

use super::edits::Edit;
use super::error::DomainError;

const MAX_SNAPSHOT_ID_LEN: usize = 128;
const SNAPSHOT_KEY_EXTENSION: &str = ".json";

/// Opaque capability token naming one stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept an identifier supplied by a client.
    ///
    /// Identifiers are opaque, but they become part of a blob key, so only
    /// ASCII alphanumerics, `-` and `_` are allowed.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("snapshot id must not be empty"));
        }
        if trimmed.len() > MAX_SNAPSHOT_ID_LEN {
            return Err(DomainError::validation(format!(
                "snapshot id exceeds {MAX_SNAPSHOT_ID_LEN} characters"
            )));
        }
        if !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(DomainError::validation(
                "snapshot id contains unsupported characters",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blob key holding this snapshot's edits.
    pub fn blob_key(&self) -> String {
        format!("{}{SNAPSHOT_KEY_EXTENSION}", self.0)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, persisted batch of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub edits: Vec<Edit>,
    pub created_at: Option<OffsetDateTime>,
}
