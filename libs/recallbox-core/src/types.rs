//! Core types for the review engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized flashcard.
///
/// Produced by [`crate::normalize`] from whatever key-naming scheme the
/// source JSON uses; everything downstream (scheduler, aligner, storage)
/// only ever sees this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable identifier. Either taken from the source record or derived
    /// as a content hash of the card text.
    pub id: String,
    pub title: String,
    /// Module (deck) this card belongs to. Empty string means unassigned.
    #[serde(default)]
    pub module: String,
    /// Rendered prompt side.
    pub front_text: String,
    /// Rendered answer side.
    pub back_text: String,
    /// The learner's own sentence, if the card carries one.
    #[serde(default)]
    pub my_sentence: String,
    /// The corrected reference sentence, if the card carries one.
    #[serde(default)]
    pub corrected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Per-card spaced-repetition progress.
///
/// This is both the in-memory state and the persisted record: the store
/// upserts exactly these three fields keyed by card id after every review
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Completed successful reviews, saturating at the plan length.
    pub step: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    /// `None` means the card was never reviewed and is always due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            step: 0,
            last_reviewed: None,
            due_date: None,
        }
    }
}

impl ReviewState {
    /// True for a state that has never been through a review.
    pub fn is_fresh(&self) -> bool {
        self.step == 0 && self.last_reviewed.is_none() && self.due_date.is_none()
    }
}

/// Parse a persisted timestamp, treating anything unparseable as absent.
///
/// Corrupt state rows must degrade to "always due" rather than fail the
/// whole load.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_fresh() {
        let state = ReviewState::default();
        assert!(state.is_fresh());
        assert_eq!(state.step, 0);
        assert!(state.due_date.is_none());
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let parsed = parse_timestamp("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T10:30:00+00:00");
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn state_serializes_without_empty_fields() {
        let json = serde_json::to_string(&ReviewState::default()).unwrap();
        assert_eq!(json, r#"{"step":0}"#);
    }
}
