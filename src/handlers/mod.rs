//! JSON API handlers.

pub mod decks;
pub mod improvements;
pub mod study;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{delete, get, post},
  Json, Router,
};
use serde_json::json;

use crate::content::DeckError;
use crate::db::DbLockError;
use crate::srs::StoreError;
use crate::state::AppState;

pub use decks::{delete_deck, get_deck, import_deck, list_decks, reset_deck, unignore_card, unlock};
pub use improvements::{apply_deck_corrections, clear_marks, export_marks, mark_card, unmark_card};
pub use study::{answer, assess, end_round, ignore_card, next_card, start_round, study_state};

/// Error response rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
  pub status: StatusCode,
  pub message: String,
}

impl ApiError {
  pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
    Self {
      status,
      message: message.into(),
    }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_REQUEST, message)
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(StatusCode::NOT_FOUND, message)
  }

  pub fn forbidden(message: impl Into<String>) -> Self {
    Self::new(StatusCode::FORBIDDEN, message)
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    Self::new(StatusCode::CONFLICT, message)
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
  }

  pub(crate) fn deck_not_found(deck_id: &str) -> Self {
    Self::not_found(format!("Deck '{}' not found", deck_id))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status, Json(json!({ "error": self.message }))).into_response()
  }
}

impl From<DbLockError> for ApiError {
  fn from(e: DbLockError) -> Self {
    Self::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
  }
}

impl From<rusqlite::Error> for ApiError {
  fn from(e: rusqlite::Error) -> Self {
    tracing::error!("Database error: {}", e);
    Self::internal("Database error")
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    tracing::error!("{}", e);
    match e {
      StoreError::Unavailable => Self::new(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable"),
      _ => Self::internal("Failed to save progress"),
    }
  }
}

impl From<DeckError> for ApiError {
  fn from(e: DeckError) -> Self {
    tracing::warn!("{}", e);
    Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.user_message())
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// All API routes
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    // Decks
    .route("/api/decks", get(list_decks).post(import_deck))
    .route("/api/decks/{deck_id}", get(get_deck).delete(delete_deck))
    .route("/api/decks/{deck_id}/reset", post(reset_deck))
    .route("/api/decks/{deck_id}/unignore", post(unignore_card))
    .route("/api/unlock", post(unlock))
    // Study rounds
    .route("/api/decks/{deck_id}/study", post(start_round))
    .route("/api/study", get(study_state))
    .route("/api/study/answer", post(answer))
    .route("/api/study/assess", post(assess))
    .route("/api/study/ignore", post(ignore_card))
    .route("/api/study/next", post(next_card))
    .route("/api/study/end", post(end_round))
    // Improvement workflow
    .route("/api/decks/{deck_id}/improvements", post(mark_card).delete(clear_marks))
    .route("/api/decks/{deck_id}/improvements/export", get(export_marks))
    .route("/api/decks/{deck_id}/improvements/{card_id}", delete(unmark_card))
    .route("/api/decks/{deck_id}/corrections", post(apply_deck_corrections))
    .with_state(state)
}
