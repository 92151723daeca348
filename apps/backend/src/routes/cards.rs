//! Card CRUD, import and export endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use recallbox_core::{normalize_card, Card, FieldAliases};
use serde_json::Value;

use crate::db::{CardStore, DbError};
use crate::error::{ApiError, Result};
use crate::models::{CardCreatedResponse, ImportResponse, ModuleQuery, UpdateCardRequest};
use crate::AppState;

fn not_found(err: DbError) -> ApiError {
    match err {
        DbError::CardNotFound(id) => ApiError::NotFound(format!("card {}", id)),
        other => other.into(),
    }
}

/// GET /api/cards
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<Vec<Card>>> {
    let store = state.store.lock().expect("store lock");
    let cards = store.list_cards(query.module.as_deref())?;
    Ok(Json(cards))
}

/// GET /api/cards/:id
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Card>> {
    let store = state.store.lock().expect("store lock");
    let card = store
        .get_card(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("card {}", id)))?;
    Ok(Json(card))
}

/// POST /api/cards
///
/// Accepts a raw card object in any of the supported key schemes; it is
/// normalized before storage.
pub async fn create(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<(StatusCode, Json<CardCreatedResponse>)> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("expected a card object".to_string()))?;
    let card = normalize_card(obj, &FieldAliases::default());

    if card.title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let store = state.store.lock().expect("store lock");
    if store.get_card(&card.id)?.is_some() {
        return Err(ApiError::BadRequest(format!(
            "card {} already exists",
            card.id
        )));
    }
    store.upsert_card(&card)?;

    tracing::info!("Created card {}", card.id);
    Ok((
        StatusCode::CREATED,
        Json(CardCreatedResponse {
            id: card.id.clone(),
            card,
        }),
    ))
}

/// PUT /api/cards/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<Card>> {
    let store = state.store.lock().expect("store lock");
    let mut card = store
        .get_card(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("card {}", id)))?;

    if let Some(title) = request.title {
        card.title = title;
    }
    if let Some(module) = request.module {
        card.module = module;
    }
    if let Some(front_text) = request.front_text {
        card.front_text = front_text;
    }
    if let Some(back_text) = request.back_text {
        card.back_text = back_text;
    }
    if let Some(my_sentence) = request.my_sentence {
        card.my_sentence = my_sentence;
    }
    if let Some(corrected) = request.corrected {
        card.corrected = corrected;
    }

    store.upsert_card(&card)?;
    Ok(Json(card))
}

/// DELETE /api/cards/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let store = state.store.lock().expect("store lock");
    store.delete_card(&id).map_err(not_found)?;
    tracing::info!("Deleted card {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/modules
pub async fn modules(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let store = state.store.lock().expect("store lock");
    Ok(Json(store.modules()?))
}

/// GET /api/export
pub async fn export(State(state): State<AppState>) -> Result<Json<Vec<Card>>> {
    let store = state.store.lock().expect("store lock");
    Ok(Json(store.list_cards(None)?))
}

/// POST /api/import
///
/// Bulk upsert of a raw JSON card array.
pub async fn import_json(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Result<Json<ImportResponse>> {
    let cards = recallbox_core::normalize_cards(&raw, &FieldAliases::default())?;
    let store = state.store.lock().expect("store lock");
    let imported = store.upsert_cards(&cards)?;
    tracing::info!("Imported {} cards", imported);
    Ok(Json(ImportResponse { imported }))
}

/// POST /api/import/csv
pub async fn import_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>> {
    let cards = crate::importer::csv_to_cards(&body)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let store = state.store.lock().expect("store lock");
    let imported = store.upsert_cards(&cards)?;
    tracing::info!("Imported {} cards from CSV", imported);
    Ok(Json(ImportResponse { imported }))
}
