//! Storage port for progress records and in-flight rounds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{CardId, Progress};

/// Enough of a round to rebuild it against the current deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
  pub deck_id: String,
  pub card_ids: Vec<CardId>,
  pub current_index: usize,
  pub score: usize,
  /// The card at `current_index` has already been scored
  #[serde(default)]
  pub current_scored: bool,
}

#[derive(Debug)]
pub enum StoreError {
  /// Backend lock poisoned or connection gone
  Unavailable,
  Database(rusqlite::Error),
  /// A stored record could not be decoded
  Corrupt(serde_json::Error),
}

impl std::fmt::Display for StoreError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Unavailable => write!(f, "Progress storage unavailable"),
      Self::Database(e) => write!(f, "Progress storage error: {}", e),
      Self::Corrupt(e) => write!(f, "Stored progress is corrupt: {}", e),
    }
  }
}

impl std::error::Error for StoreError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Unavailable => None,
      Self::Database(e) => Some(e),
      Self::Corrupt(e) => Some(e),
    }
  }
}

impl From<rusqlite::Error> for StoreError {
  fn from(e: rusqlite::Error) -> Self {
    Self::Database(e)
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(e: serde_json::Error) -> Self {
    Self::Corrupt(e)
  }
}

/// Persistence for per-deck progress and the saved round of each deck.
///
/// Loading a deck that was never stored yields empty progress and no round.
pub trait ProgressStore: Send + Sync {
  fn load_progress(&self, deck_id: &str) -> Result<Progress, StoreError>;
  fn save_progress(&self, deck_id: &str, progress: &Progress) -> Result<(), StoreError>;
  fn clear_progress(&self, deck_id: &str) -> Result<(), StoreError>;

  fn save_round(&self, snapshot: &RoundSnapshot) -> Result<(), StoreError>;
  fn load_round(&self, deck_id: &str) -> Result<Option<RoundSnapshot>, StoreError>;
  fn clear_round(&self, deck_id: &str) -> Result<(), StoreError>;
}

/// Process-local store, used in tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
  progress: Mutex<HashMap<String, Progress>>,
  rounds: Mutex<HashMap<String, RoundSnapshot>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ProgressStore for MemoryStore {
  fn load_progress(&self, deck_id: &str) -> Result<Progress, StoreError> {
    let map = self.progress.lock().map_err(|_| StoreError::Unavailable)?;
    Ok(map.get(deck_id).cloned().unwrap_or_default())
  }

  fn save_progress(&self, deck_id: &str, progress: &Progress) -> Result<(), StoreError> {
    let mut map = self.progress.lock().map_err(|_| StoreError::Unavailable)?;
    map.insert(deck_id.to_string(), progress.clone());
    Ok(())
  }

  fn clear_progress(&self, deck_id: &str) -> Result<(), StoreError> {
    let mut map = self.progress.lock().map_err(|_| StoreError::Unavailable)?;
    map.remove(deck_id);
    Ok(())
  }

  fn save_round(&self, snapshot: &RoundSnapshot) -> Result<(), StoreError> {
    let mut map = self.rounds.lock().map_err(|_| StoreError::Unavailable)?;
    map.insert(snapshot.deck_id.clone(), snapshot.clone());
    Ok(())
  }

  fn load_round(&self, deck_id: &str) -> Result<Option<RoundSnapshot>, StoreError> {
    let map = self.rounds.lock().map_err(|_| StoreError::Unavailable)?;
    Ok(map.get(deck_id).cloned())
  }

  fn clear_round(&self, deck_id: &str) -> Result<(), StoreError> {
    let mut map = self.rounds.lock().map_err(|_| StoreError::Unavailable)?;
    map.remove(deck_id);
    Ok(())
  }
}
