//! Field edits and the capture routine that produces them.
//!
//! An edit pairs the stable identifier of an editable region with the plain
//! text the visitor left in it. Capture is deliberately independent of any
//! rendering technology: callers describe the page as an ordered list of
//! [`EditableRegion`]s and get back the edits in the same order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A single field edit. Serialized as `{"id": ..., "innerText": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    #[serde(rename = "id")]
    pub field_id: String,
    #[serde(rename = "innerText")]
    pub text: String,
}

impl Edit {
    pub fn new(field_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            text: text.into(),
        }
    }
}

/// A region of the rendered page as seen at share time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableRegion {
    pub field_id: String,
    /// Plain rendered text, without markup.
    pub text: String,
    /// Whether the region is currently flagged as interactively editable.
    pub editable: bool,
}

impl EditableRegion {
    pub fn editable(field_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            text: text.into(),
            editable: true,
        }
    }

    pub fn read_only(field_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            text: text.into(),
            editable: false,
        }
    }
}

/// Collect one edit per editable region, preserving document order.
pub fn capture_edits<'a, I>(regions: I) -> Vec<Edit>
where
    I: IntoIterator<Item = &'a EditableRegion>,
{
    regions
        .into_iter()
        .filter(|region| region.editable)
        .map(|region| Edit::new(region.field_id.clone(), region.text.clone()))
        .collect()
}

/// Check that every edit names a field and that no field appears twice.
pub fn validate_batch(edits: &[Edit]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(edits.len());
    for (index, edit) in edits.iter().enumerate() {
        if edit.field_id.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "edit #{index} has an empty field id"
            )));
        }
        if !seen.insert(edit.field_id.as_str()) {
            return Err(DomainError::validation(format!(
                "field `{}` appears more than once",
                edit.field_id
            )));
        }
    }
    Ok(())
}
