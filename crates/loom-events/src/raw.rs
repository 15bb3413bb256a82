//! Raw thread records as they arrive from a host's persistence layer.
//!
//! Every field is optional so that records from simpler legacy trackers
//! still deserialize. Chapter numbers are signed because stored history
//! may be corrupt; the engine clamps them during ingestion.

use serde::{Deserialize, Serialize};

use crate::thread::ProgressMark;

/// An unvalidated thread-like record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawThread {
    pub id: Option<String>,
    pub title: Option<String>,
    pub signature: Option<String>,
    /// Category label, legacy names accepted
    pub category: Option<String>,
    /// Status label
    pub status: Option<String>,
    pub karma_weight: Option<f32>,
    pub payoff_debt: Option<f32>,
    pub first_chapter: Option<i64>,
    pub last_mentioned_chapter: Option<i64>,
    pub blooming_chapter: Option<i64>,
    pub mention_count: Option<i64>,
    pub progress_count: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub progress_log: Vec<ProgressMark>,
    /// Legacy "done" flag from trackers without a status field
    pub resolved: bool,
    pub summary: Option<String>,
    pub resolution_criteria: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    pub intentional_abandonment: bool,
}

impl RawThread {
    /// Creates a record carrying only the identity fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Sets the category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the first and last mentioned chapters.
    pub fn with_chapters(mut self, first: i64, last_mentioned: i64) -> Self {
        self.first_chapter = Some(first);
        self.last_mentioned_chapter = Some(last_mentioned);
        self
    }

    /// Parses a JSON array of raw records.
    pub fn parse_batch(json: &str) -> Result<Vec<RawThread>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_deserializes() {
        let json = r#"{"id": "plot-7", "title": "The missing heir", "resolved": true}"#;
        let raw: RawThread = serde_json::from_str(json).unwrap();

        assert_eq!(raw.id.as_deref(), Some("plot-7"));
        assert!(raw.resolved);
        assert!(raw.category.is_none());
        assert!(raw.participants.is_empty());
    }

    #[test]
    fn test_negative_chapters_survive_parsing() {
        let json = r#"[{"id": "a", "title": "A", "last_mentioned_chapter": -4}]"#;
        let batch = RawThread::parse_batch(json).unwrap();
        assert_eq!(batch[0].last_mentioned_chapter, Some(-4));
    }

    #[test]
    fn test_builder() {
        let raw = RawThread::new("t-1", "Oath of the ferryman")
            .with_category("major")
            .with_chapters(2, 9);
        assert_eq!(raw.category.as_deref(), Some("major"));
        assert_eq!(raw.first_chapter, Some(2));
        assert_eq!(raw.last_mentioned_chapter, Some(9));
    }
}
