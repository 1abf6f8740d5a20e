//! Application state shared by all handlers.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::AppConfig;
use crate::content::{DeckCatalog, UnlockCodes};
use crate::db::{DbPool, SqliteCardMetrics, SqliteStore};
use crate::domain::Deck;
use crate::srs::RoundPorts;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
  /// Shared database connection
  pub db: DbPool,
  /// Static and user decks
  pub catalog: Arc<RwLock<DeckCatalog>>,
  pub unlock_codes: Arc<UnlockCodes>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(db: DbPool, catalog: DeckCatalog, unlock_codes: UnlockCodes, config: AppConfig) -> Self {
    Self {
      db,
      catalog: Arc::new(RwLock::new(catalog)),
      unlock_codes: Arc::new(unlock_codes),
      config: Arc::new(config),
    }
  }

  pub fn catalog(&self) -> RwLockReadGuard<'_, DeckCatalog> {
    self
      .catalog
      .read()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
  }

  pub fn catalog_mut(&self) -> RwLockWriteGuard<'_, DeckCatalog> {
    self
      .catalog
      .write()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
  }

  /// Copy of a deck from the catalog
  pub fn deck(&self, deck_id: &str) -> Option<Deck> {
    self.catalog().get(deck_id).cloned()
  }

  /// Progress store and card metrics backed by the database
  pub fn round_ports(&self) -> RoundPorts {
    RoundPorts::new(
      Arc::new(SqliteStore::new(self.db.clone())),
      Arc::new(SqliteCardMetrics::new(self.db.clone())),
    )
  }
}
