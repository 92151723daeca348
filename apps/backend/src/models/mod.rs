//! Request and response types for the API.

use chrono::{DateTime, Utc};
use recallbox_core::{Card, DiffSpan, ReviewState};
use serde::{Deserialize, Serialize};

/// Optional module filter accepted by listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ModuleQuery {
    pub module: Option<String>,
}

/// Partial card update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub module: Option<String>,
    pub front_text: Option<String>,
    pub back_text: Option<String>,
    pub my_sentence: Option<String>,
    pub corrected: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CardCreatedResponse {
    pub id: String,
    pub card: Card,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// State after a review mutation (or on state lookup).
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub card_id: String,
    pub state: ReviewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct DiffRequest {
    pub mine: String,
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub spans: Vec<DiffSpan>,
    pub html: String,
}
