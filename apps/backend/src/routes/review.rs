//! Review scheduling endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use recallbox_core::Card;

use crate::db::{CardStore, StateStore};
use crate::error::{ApiError, Result};
use crate::models::{ModuleQuery, ReviewResponse};
use crate::AppState;

/// GET /api/review/due
///
/// Due cards under the optional module filter, in stored order. Cards
/// without persisted state have never been reviewed and are always due.
pub async fn due(
    State(state): State<AppState>,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<Vec<Card>>> {
    let store = state.store.lock().expect("store lock");
    let cards = store.list_cards(query.module.as_deref())?;
    let states = store.all_states()?;

    let due: Vec<Card> = state
        .scheduler
        .due_list(&cards, &states, Utc::now())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(due))
}

/// GET /api/review/:id
pub async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>> {
    let store = state.store.lock().expect("store lock");
    store
        .get_card(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("card {}", id)))?;

    let review_state = state
        .scheduler
        .sanitize(store.get_state(&id)?.unwrap_or_default());

    Ok(Json(ReviewResponse {
        card_id: id,
        state: review_state,
        next_due: None,
    }))
}

/// POST /api/review/:id/complete
///
/// Advance the card one plan step and write the new state through.
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>> {
    let store = state.store.lock().expect("store lock");
    store
        .get_card(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("card {}", id)))?;

    let current = state
        .scheduler
        .sanitize(store.get_state(&id)?.unwrap_or_default());
    let outcome = state.scheduler.complete_review(&current, Utc::now());
    store.save_state(&id, &outcome.new_state)?;

    tracing::info!(
        "Reviewed card {}: step {} -> {}",
        id,
        current.step,
        outcome.new_state.step
    );
    Ok(Json(ReviewResponse {
        card_id: id,
        state: outcome.new_state,
        next_due: Some(outcome.next_due),
    }))
}

/// POST /api/review/:id/reset
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>> {
    let store = state.store.lock().expect("store lock");
    store
        .get_card(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("card {}", id)))?;

    let fresh = state.scheduler.reset_progress();
    store.save_state(&id, &fresh)?;

    tracing::info!("Reset progress for card {}", id);
    Ok(Json(ReviewResponse {
        card_id: id,
        state: fresh,
        next_due: None,
    }))
}
