//! Deck catalog and deck management handlers.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};
use axum_extra::extract::CookieJar;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::study::session_id;
use super::{ApiError, ApiResult};
use crate::content::prepare_import;
use crate::db::{self, try_lock, CardStats, DeckData, LogOnError};
use crate::domain::{Card, CardId, Deck, DeckType, ImprovementMark, Progress, ProgressStats};
use crate::session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
  pub id: String,
  pub name: String,
  pub description: String,
  pub deck_type: DeckType,
  pub card_count: usize,
  /// Locked and not yet unlocked
  pub locked: bool,
  pub is_user_deck: bool,
  pub stats: ProgressStats,
  pub percentage: u8,
  pub complete: bool,
}

impl DeckSummary {
  fn new(deck: &Deck, progress: &Progress, locked: bool) -> Self {
    let stats = progress.stats(deck);
    Self {
      id: deck.id.clone(),
      name: deck.name.clone(),
      description: deck.description.clone(),
      deck_type: deck.deck_type,
      card_count: deck.len(),
      locked,
      is_user_deck: deck.is_user_deck,
      stats,
      percentage: stats.percentage(),
      complete: stats.is_complete(),
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRef {
  pub card_id: CardId,
  pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckDetail {
  #[serde(flatten)]
  pub summary: DeckSummary,
  pub cards: Vec<Card>,
  pub progress: Progress,
  pub ignored_cards: Vec<CardRef>,
  pub improvement_marks: Vec<ImprovementMark>,
  pub card_stats: Vec<CardStats>,
}

/// True if the deck is locked and has not been unlocked
pub(crate) fn is_locked(conn: &Connection, deck: &Deck) -> bool {
  deck.locked
    && !db::is_deck_unlocked(conn, &deck.id).log_warn_default("Failed to check unlocked decks")
}

pub(crate) fn ensure_unlocked(conn: &Connection, deck: &Deck) -> ApiResult<()> {
  if is_locked(conn, deck) {
    return Err(ApiError::forbidden(format!("Deck '{}' is locked", deck.id)));
  }
  Ok(())
}

/// GET /api/decks
pub async fn list_decks(State(state): State<AppState>) -> ApiResult<Json<Vec<DeckSummary>>> {
  let conn = try_lock(&state.db)?;
  let catalog = state.catalog();

  let mut summaries = Vec::new();
  for deck in catalog.decks() {
    let progress = db::load_progress(&conn, &deck.id)?;
    summaries.push(DeckSummary::new(deck, &progress, is_locked(&conn, deck)));
  }
  Ok(Json(summaries))
}

/// GET /api/decks/{deck_id}
pub async fn get_deck(State(state): State<AppState>, Path(deck_id): Path<String>) -> ApiResult<Json<DeckDetail>> {
  let deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;
  let conn = try_lock(&state.db)?;
  ensure_unlocked(&conn, &deck)?;

  let progress = db::load_progress(&conn, &deck.id)?;
  let ignored_cards = deck
    .cards
    .iter()
    .filter(|c| progress.is_ignored(&c.card_id))
    .map(|c| CardRef {
      card_id: c.card_id.clone(),
      label: c.label(),
    })
    .collect();
  let improvement_marks = db::get_improvement_marks(&conn, &deck.id)?;
  let card_stats = db::get_card_stats(&conn, &deck.id)?;

  Ok(Json(DeckDetail {
    summary: DeckSummary::new(&deck, &progress, false),
    cards: deck.cards.clone(),
    progress,
    ignored_cards,
    improvement_marks,
    card_stats,
  }))
}

/// POST /api/decks
///
/// Imports a user deck. Cards without an id get one assigned.
pub async fn import_deck(
  State(state): State<AppState>,
  Json(deck): Json<Deck>,
) -> ApiResult<(StatusCode, Json<DeckSummary>)> {
  let deck = prepare_import(deck)?;
  let conn = try_lock(&state.db)?;
  db::save_user_deck(&conn, &deck)?;

  let summary = {
    let mut catalog = state.catalog_mut();
    if catalog.is_static(&deck.id) {
      tracing::info!("User deck {} replaces the static deck", deck.id);
    }
    catalog.upsert_user_deck(deck.clone());
    let stored = catalog.get(&deck.id).unwrap_or(&deck);
    let progress = db::load_progress(&conn, &deck.id)?;
    DeckSummary::new(stored, &progress, is_locked(&conn, stored))
  };

  tracing::info!("Imported user deck {} ({} cards)", deck.id, deck.len());
  Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /api/decks/{deck_id}
///
/// Only user decks can be deleted. Progress, marks and stats go with them,
/// unless the user deck shadows a static deck, which then keeps its history.
pub async fn delete_deck(
  State(state): State<AppState>,
  Path(deck_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
  let shadows_static = {
    let catalog = state.catalog();
    if !catalog.is_user_deck(&deck_id) {
      return Err(if catalog.is_static(&deck_id) {
        ApiError::forbidden("Static decks cannot be deleted")
      } else {
        ApiError::deck_not_found(&deck_id)
      });
    }
    catalog.is_static(&deck_id)
  };

  let data = if shadows_static { DeckData::Keep } else { DeckData::Purge };
  {
    let conn = try_lock(&state.db)?;
    db::delete_user_deck(&conn, &deck_id, data)?;
  }
  state.catalog_mut().remove_user_deck(&deck_id);
  // Rounds commit through the database, so the connection must be released
  session::end_rounds_for_deck(&deck_id);

  if shadows_static {
    tracing::info!("Deleted user deck {}, static deck restored", deck_id);
  } else {
    tracing::info!("Deleted user deck {}", deck_id);
  }
  Ok(Json(serde_json::json!({ "deleted": deck_id })))
}

/// POST /api/decks/{deck_id}/reset
///
/// Clears progress and any saved or active round for the deck.
pub async fn reset_deck(
  State(state): State<AppState>,
  Path(deck_id): Path<String>,
) -> ApiResult<Json<DeckSummary>> {
  let deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;
  let locked = {
    let conn = try_lock(&state.db)?;
    db::clear_progress(&conn, &deck.id)?;
    db::clear_round(&conn, &deck.id)?;
    is_locked(&conn, &deck)
  };
  session::end_rounds_for_deck(&deck.id);

  tracing::info!("Reset progress for deck {}", deck.id);
  Ok(Json(DeckSummary::new(&deck, &Progress::new(), locked)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnignoreRequest {
  pub card_id: CardId,
}

/// POST /api/decks/{deck_id}/unignore
///
/// Returns an ignored card to the new pool. Not allowed while this session
/// is studying the deck.
pub async fn unignore_card(
  State(state): State<AppState>,
  Path(deck_id): Path<String>,
  jar: CookieJar,
  Json(request): Json<UnignoreRequest>,
) -> ApiResult<Json<DeckSummary>> {
  let deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;

  if let Some(sid) = session_id(&jar) {
    let studying = session::with_round(&sid, |round| round.deck_id() == deck.id && !round.is_over());
    if studying == Some(true) {
      return Err(ApiError::conflict("Finish the current round before restoring cards"));
    }
  }

  let conn = try_lock(&state.db)?;
  let mut progress = db::load_progress(&conn, &deck.id)?;
  if !progress.unignore(&request.card_id) {
    return Err(ApiError::not_found(format!("Card '{}' is not ignored", request.card_id)));
  }
  db::save_progress(&conn, &deck.id, &progress)?;

  tracing::info!("Deck {}: restored card {}", deck.id, request.card_id);
  let locked = is_locked(&conn, &deck);
  Ok(Json(DeckSummary::new(&deck, &progress, locked)))
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
  pub code: String,
}

/// POST /api/unlock
pub async fn unlock(
  State(state): State<AppState>,
  Json(request): Json<UnlockRequest>,
) -> ApiResult<Json<serde_json::Value>> {
  let deck_id = state
    .unlock_codes
    .deck_for_code(&request.code)
    .ok_or_else(|| ApiError::not_found("Invalid unlock code"))?
    .to_string();

  let conn = try_lock(&state.db)?;
  db::unlock_deck(&conn, &deck_id)?;

  let name = state.deck(&deck_id).map(|d| d.name);
  tracing::info!("Unlocked deck {}", deck_id);
  Ok(Json(serde_json::json!({ "deckId": deck_id, "name": name })))
}
