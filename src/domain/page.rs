//! Default content of the demo page and the snapshot overlay.

use std::collections::HashMap;

use super::edits::Edit;

/// An editable region with its built-in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDefault {
    pub field_id: &'static str,
    pub text: &'static str,
}

const fn region(field_id: &'static str, text: &'static str) -> RegionDefault {
    RegionDefault { field_id, text }
}

static DEFAULT_REGIONS: &[RegionDefault] = &[
    region("title", "Make the page your own"),
    region(
        "tagline",
        "Edit any highlighted text in place, then share a link to your version.",
    ),
    region(
        "intro",
        "Turn on edit mode, click a heading or paragraph, and type. Nothing you change here is \
         published; sharing stores a snapshot that only people holding the link can preview.",
    ),
    region("feature-1-title", "Edit in place"),
    region(
        "feature-1-body",
        "Every region marked editable becomes a text field without leaving the page.",
    ),
    region("feature-2-title", "Share a snapshot"),
    region(
        "feature-2-body",
        "Sharing captures the visible text of each editable region and stores it once.",
    ),
    region("feature-3-title", "Preview anywhere"),
    region(
        "feature-3-body",
        "Opening a preview link overlays the snapshot on this page until you exit preview.",
    ),
    region("cta", "Try editing this sentence."),
];

/// Field ids of the three feature cards, as (heading, body) pairs.
pub const FEATURE_CARDS: [(&str, &str); 3] = [
    ("feature-1-title", "feature-1-body"),
    ("feature-2-title", "feature-2-body"),
    ("feature-3-title", "feature-3-body"),
];

pub fn default_regions() -> &'static [RegionDefault] {
    DEFAULT_REGIONS
}

/// A region ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRegion {
    pub field_id: &'static str,
    pub text: String,
    pub overridden: bool,
}

/// Page content after (optionally) overlaying a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    regions: Vec<RenderedRegion>,
}

impl PageContent {
    /// Default content with no overlay.
    pub fn defaults() -> Self {
        Self::overlay(&[])
    }

    /// Replace the text of every region named by an edit.
    ///
    /// Regions without a matching edit keep their default text. Edits naming
    /// unknown regions are ignored.
    pub fn overlay(edits: &[Edit]) -> Self {
        let by_field: HashMap<&str, &str> = edits
            .iter()
            .map(|edit| (edit.field_id.as_str(), edit.text.as_str()))
            .collect();

        let regions = DEFAULT_REGIONS
            .iter()
            .map(|default| match by_field.get(default.field_id) {
                Some(text) => RenderedRegion {
                    field_id: default.field_id,
                    text: (*text).to_string(),
                    overridden: true,
                },
                None => RenderedRegion {
                    field_id: default.field_id,
                    text: default.text.to_string(),
                    overridden: false,
                },
            })
            .collect();

        Self { regions }
    }

    /// Text currently shown for `field_id`; empty for unknown ids.
    pub fn text(&self, field_id: &str) -> &str {
        self.find(field_id)
            .map(|region| region.text.as_str())
            .unwrap_or("")
    }

    pub fn is_overridden(&self, field_id: &str) -> bool {
        self.find(field_id)
            .map(|region| region.overridden)
            .unwrap_or(false)
    }

    /// Edits that would reproduce this content from the defaults.
    pub fn overrides(&self) -> Vec<Edit> {
        self.regions
            .iter()
            .filter(|region| region.overridden)
            .map(|region| Edit::new(region.field_id, region.text.clone()))
            .collect()
    }

    fn find(&self, field_id: &str) -> Option<&RenderedRegion> {
        self.regions
            .iter()
            .find(|region| region.field_id == field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_field_ids_are_unique() {
        let mut ids: Vec<_> = default_regions().iter().map(|r| r.field_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), default_regions().len());
    }

    #[test]
    fn feature_cards_reference_known_regions() {
        let content = PageContent::defaults();
        for (heading, body) in FEATURE_CARDS {
            assert!(!content.text(heading).is_empty());
            assert!(!content.text(body).is_empty());
        }
    }

    #[test]
    fn overlay_replaces_only_matching_regions() {
        let content = PageContent::overlay(&[Edit::new("title", "Hello")]);

        assert_eq!(content.text("title"), "Hello");
        assert!(content.is_overridden("title"));
        for region in default_regions().iter().filter(|r| r.field_id != "title") {
            assert_eq!(content.text(region.field_id), region.text);
            assert!(!content.is_overridden(region.field_id));
        }
    }

    #[test]
    fn overlay_ignores_unknown_fields() {
        let content = PageContent::overlay(&[Edit::new("sidebar", "nope")]);
        assert_eq!(content, PageContent::defaults());
    }

    #[test]
    fn overrides_round_trip_in_page_order() {
        let edits = vec![Edit::new("tagline", "Two"), Edit::new("cta", "Three")];
        let content = PageContent::overlay(&edits);
        assert_eq!(content.overrides(), edits);
    }
}
