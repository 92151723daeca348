//! Common test utilities for the API integration tests.
//!
//! Builds the full router over an in-memory SQLite store, so the suite
//! runs without any external services.

use axum::Router;
use serde_json::{json, Value};

use recallbox_backend::db::{CardStore, SqliteStore};
use recallbox_backend::{app, AppState};
use recallbox_core::{Card, IntervalPlan, Scheduler};

/// Test context holding the shared state and router.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Fresh context with an empty in-memory store and the default
    /// `[3, 6, 12]` plan.
    pub fn new() -> Self {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        let state = AppState::new(store, Scheduler::new(IntervalPlan::default()));
        let app = app(state.clone());
        Self { state, app }
    }

    /// Router clone for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Insert a card directly into the store.
    pub fn seed_card(&self, id: &str, module: &str) -> Card {
        let card = Card {
            id: id.to_string(),
            title: format!("card {}", id),
            module: module.to_string(),
            front_text: format!("Original: front of {}", id),
            back_text: String::new(),
            my_sentence: String::new(),
            corrected: String::new(),
            created: None,
        };
        let store = self.state.store.lock().expect("store lock");
        store.upsert_card(&card).expect("seed card");
        card
    }
}

/// A raw card payload in the flat editor key scheme.
pub fn raw_flat_card(id: &str, title: &str) -> Value {
    json!({
        "cardId": id,
        "title": title,
        "Original": "I give up smoking",
        "Mysentence": "I gave up to smoke",
        "Corrected": "I gave up smoking",
    })
}

/// A raw card payload in the nested front/back key scheme.
pub fn raw_nested_card(id: &str, module: &str) -> Value {
    json!({
        "id": id,
        "key_module": format!("topic {}", id),
        "module": module,
        "front": { "Original": format!("phrase {}", id) },
        "back": { "My sentence": "mine", "AI correction": "theirs" },
    })
}
