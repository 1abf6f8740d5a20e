//! Improvement workflow: mark cards, export them for editing, apply the
//! corrected batch back to the deck.

use axum::{
  extract::{Path, State},
  Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, ApiResult};
use crate::config;
use crate::content::{apply_corrections, validate_deck, CorrectionReport};
use crate::db::{self, try_lock};
use crate::domain::{build_export_batch, CardId, ImprovementMark};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
  pub card_id: CardId,
  pub request: String,
}

/// POST /api/decks/{deck_id}/improvements
pub async fn mark_card(
  State(state): State<AppState>,
  Path(deck_id): Path<String>,
  Json(mark): Json<MarkRequest>,
) -> ApiResult<Json<Vec<ImprovementMark>>> {
  let deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;
  if deck.card(&mark.card_id).is_none() {
    return Err(ApiError::not_found(format!("Card '{}' not found", mark.card_id)));
  }

  let request = mark.request.trim();
  if request.is_empty() {
    return Err(ApiError::bad_request("Describe what should be improved"));
  }
  if request.chars().count() > config::MAX_IMPROVEMENT_REQUEST_LEN {
    return Err(ApiError::bad_request(format!(
      "Request is too long (max {} characters)",
      config::MAX_IMPROVEMENT_REQUEST_LEN
    )));
  }

  let conn = try_lock(&state.db)?;
  db::mark_for_improvement(&conn, &deck.id, &mark.card_id, request)?;
  tracing::info!("Deck {}: card {} marked for improvement", deck.id, mark.card_id);
  Ok(Json(db::get_improvement_marks(&conn, &deck.id)?))
}

/// DELETE /api/decks/{deck_id}/improvements/{card_id}
pub async fn unmark_card(
  State(state): State<AppState>,
  Path((deck_id, card_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ImprovementMark>>> {
  let conn = try_lock(&state.db)?;
  if !db::unmark_improvement(&conn, &deck_id, &card_id)? {
    return Err(ApiError::not_found(format!("Card '{}' is not marked", card_id)));
  }
  Ok(Json(db::get_improvement_marks(&conn, &deck_id)?))
}

/// DELETE /api/decks/{deck_id}/improvements
pub async fn clear_marks(State(state): State<AppState>, Path(deck_id): Path<String>) -> ApiResult<Json<Value>> {
  let conn = try_lock(&state.db)?;
  let cleared = db::clear_improvement_marks(&conn, &deck_id)?;
  tracing::info!("Deck {}: cleared {} improvement marks", deck_id, cleared);
  Ok(Json(serde_json::json!({ "cleared": cleared })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBatch {
  pub deck_id: String,
  pub deck_name: String,
  pub count: usize,
  pub cards: Vec<Value>,
}

/// GET /api/decks/{deck_id}/improvements/export
///
/// Marked cards as they currently exist, each carrying its `review_request`.
pub async fn export_marks(State(state): State<AppState>, Path(deck_id): Path<String>) -> ApiResult<Json<ExportBatch>> {
  let deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;
  let marks = {
    let conn = try_lock(&state.db)?;
    db::get_improvement_marks(&conn, &deck.id)?
  };

  let cards = build_export_batch(&deck, &marks);
  if cards.is_empty() {
    return Err(ApiError::not_found(
      "There are no cards marked for improvement to export.",
    ));
  }

  Ok(Json(ExportBatch {
    deck_id: deck.id.clone(),
    deck_name: deck.name.clone(),
    count: cards.len(),
    cards,
  }))
}

/// POST /api/decks/{deck_id}/corrections
///
/// Applies a batch of corrected cards. The corrected deck is stored as a user
/// deck, which shadows a static deck of the same id. Marks on corrected cards
/// are cleared.
pub async fn apply_deck_corrections(
  State(state): State<AppState>,
  Path(deck_id): Path<String>,
  Json(batch): Json<Vec<Value>>,
) -> ApiResult<Json<CorrectionReport>> {
  let mut deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;

  let report = apply_corrections(&mut deck, batch);
  if report.updated.is_empty() {
    return Err(ApiError::bad_request(format!(
      "No cards were corrected ({} unknown, {} invalid)",
      report.unknown.len(),
      report.invalid
    )));
  }
  validate_deck(&deck)?;

  let conn = try_lock(&state.db)?;
  db::save_user_deck(&conn, &deck)?;
  for card_id in &report.updated {
    db::unmark_improvement(&conn, &deck.id, card_id)?;
  }
  state.catalog_mut().upsert_user_deck(deck.clone());

  tracing::info!(
    "Deck {}: applied {} corrections ({} unknown, {} invalid)",
    deck.id,
    report.updated.len(),
    report.unknown.len(),
    report.invalid
  );
  Ok(Json(report))
}
