//! Test utilities for database and deck setup.
//!
//! Reuses the production schema initialization so tests run against the
//! same tables as the server.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::AppConfig;
use crate::content::{DeckCatalog, UnlockCodes};
use crate::db::{self, DbPool};
use crate::domain::Deck;
use crate::state::AppState;

/// Temporary data directory with a migrated database and an empty decks dir.
///
/// Everything is removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub pool: DbPool,
    pub decks_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> std::io::Result<Self> {
        let temp = TempDir::new()?;
        let pool = db::init_db(&temp.path().join("smart_decks.db")).map_err(std::io::Error::other)?;
        let decks_dir = temp.path().join("decks");
        std::fs::create_dir_all(&decks_dir)?;
        Ok(Self {
            temp,
            pool,
            decks_dir,
        })
    }

    /// Write a static deck file into the decks directory.
    pub fn write_deck(&self, deck: &Deck) -> std::io::Result<PathBuf> {
        let path = self.decks_dir.join(format!("{}.json", deck.id));
        let json = serde_json::to_string_pretty(deck).map_err(std::io::Error::other)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Catalog of the deck files written so far plus stored user decks.
    pub fn catalog(&self) -> DeckCatalog {
        let conn = self.pool.lock().unwrap();
        DeckCatalog::load(&self.decks_dir, &conn).unwrap()
    }

    /// Application state over this environment.
    pub fn state(&self, unlock_codes: UnlockCodes) -> AppState {
        let config = AppConfig {
            database_path: self.temp.path().join("smart_decks.db"),
            decks_dir: self.decks_dir.clone(),
            ..AppConfig::default()
        };
        AppState::new(self.pool.clone(), self.catalog(), unlock_codes, config)
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}
