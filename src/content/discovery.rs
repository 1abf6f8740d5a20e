//! Deck discovery and the merged deck catalog.

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::decks::load_deck_file;
use crate::db;
use crate::domain::Deck;

/// Load every `*.json` deck in a directory.
///
/// Returns successfully parsed decks sorted by id; logs errors for invalid
/// files. A missing directory yields no decks.
pub fn scan_deck_directory(dir: &Path) -> Vec<Deck> {
  let mut decks = Vec::new();

  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) => {
      tracing::warn!("Deck directory {} not readable: {}", dir.display(), e);
      return decks;
    }
  };

  for entry in entries.filter_map(|e| e.ok()) {
    let path = entry.path();
    if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
      continue;
    }

    match load_deck_file(&path) {
      Ok(deck) => {
        tracing::debug!("Loaded deck {} ({} cards) from {}", deck.id, deck.len(), path.display());
        decks.push(deck);
      }
      Err(e) => tracing::warn!("Invalid deck at {}: {}", path.display(), e),
    }
  }

  decks.sort_by(|a, b| a.id.cmp(&b.id));
  decks
}

/// All decks available for study: static decks overlaid with user decks.
#[derive(Debug, Default, Clone)]
pub struct DeckCatalog {
  static_decks: BTreeMap<String, Deck>,
  user_decks: BTreeMap<String, Deck>,
}

impl DeckCatalog {
  pub fn new(static_decks: Vec<Deck>, user_decks: Vec<Deck>) -> Self {
    let mut catalog = Self::default();
    for deck in static_decks {
      if catalog.static_decks.contains_key(&deck.id) {
        tracing::warn!("Duplicate static deck id {}, keeping the first", deck.id);
        continue;
      }
      catalog.static_decks.insert(deck.id.clone(), deck);
    }
    for deck in user_decks {
      catalog.upsert_user_deck(deck);
    }
    catalog
  }

  /// Build the catalog from the decks directory and the user decks table.
  pub fn load(decks_dir: &Path, conn: &Connection) -> rusqlite::Result<Self> {
    let static_decks = scan_deck_directory(decks_dir);
    let user_decks = db::get_user_decks(conn)?;
    let catalog = Self::new(static_decks, user_decks);
    tracing::info!(
      "Deck catalog: {} static, {} user",
      catalog.static_decks.len(),
      catalog.user_decks.len()
    );
    Ok(catalog)
  }

  pub fn get(&self, deck_id: &str) -> Option<&Deck> {
    self
      .user_decks
      .get(deck_id)
      .or_else(|| self.static_decks.get(deck_id))
  }

  /// Static decks first (unless replaced by a user deck), then user decks.
  pub fn decks(&self) -> Vec<&Deck> {
    self
      .static_decks
      .values()
      .filter(|d| !self.user_decks.contains_key(&d.id))
      .chain(self.user_decks.values())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.decks().len()
  }

  pub fn is_empty(&self) -> bool {
    self.static_decks.is_empty() && self.user_decks.is_empty()
  }

  pub fn is_static(&self, deck_id: &str) -> bool {
    self.static_decks.contains_key(deck_id)
  }

  pub fn is_user_deck(&self, deck_id: &str) -> bool {
    self.user_decks.contains_key(deck_id)
  }

  pub fn upsert_user_deck(&mut self, mut deck: Deck) {
    deck.is_user_deck = true;
    // A user copy of a static deck keeps the static lock state
    deck.locked = self.static_decks.get(&deck.id).is_some_and(|d| d.locked);
    self.user_decks.insert(deck.id.clone(), deck);
  }

  /// Remove a user deck. A static deck it replaced becomes visible again.
  pub fn remove_user_deck(&mut self, deck_id: &str) -> Option<Deck> {
    self.user_decks.remove(deck_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Card, DeckType};

  fn deck(id: &str, name: &str) -> Deck {
    Deck::new(id, name, DeckType::Flippable, vec![Card::flippable("a", "A", &["a"])])
  }

  #[test]
  fn test_scan_skips_invalid_and_non_json() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(
      dir.path().join("b.json"),
      r#"{"id": "b", "name": "B", "deckType": "flippable", "cards": []}"#,
    )
    .unwrap();
    fs::write(
      dir.path().join("a.json"),
      r#"{"id": "a", "name": "A", "cards": [{"cardId": "q", "options": ["x"], "correctAnswer": "x"}]}"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), "[").unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let decks = scan_deck_directory(dir.path());
    let ids: Vec<&str> = decks.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
  }

  #[test]
  fn test_scan_missing_directory() {
    assert!(scan_deck_directory(Path::new("/definitely/not/here")).is_empty());
  }

  #[test]
  fn test_user_deck_overrides_static() {
    let mut catalog = DeckCatalog::new(vec![deck("git", "Static Git"), deck("sql", "SQL")], vec![]);
    catalog.upsert_user_deck(deck("git", "My Git"));

    assert_eq!(catalog.get("git").unwrap().name, "My Git");
    assert_eq!(catalog.len(), 2);
    assert!(catalog.is_static("git"));
    assert!(catalog.is_user_deck("git"));

    catalog.remove_user_deck("git");
    assert_eq!(catalog.get("git").unwrap().name, "Static Git");
  }

  #[test]
  fn test_user_copy_keeps_lock() {
    let mut locked = deck("secret", "Secret");
    locked.locked = true;
    let mut catalog = DeckCatalog::new(vec![locked], vec![]);
    catalog.upsert_user_deck(deck("secret", "Edited"));
    assert!(catalog.get("secret").unwrap().locked);
  }

  #[test]
  fn test_decks_lists_static_then_user() {
    let catalog = DeckCatalog::new(vec![deck("z_static", "Z")], vec![deck("a_user", "A")]);
    let ids: Vec<&str> = catalog.decks().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["z_static", "a_user"]);
  }

  #[test]
  fn test_load_merges_database_decks() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(
      dir.path().join("s.json"),
      r#"{"id": "s", "name": "S", "deckType": "flippable", "cards": []}"#,
    )
    .unwrap();
    let pool = db::open_in_memory().unwrap();
    let conn = pool.lock().unwrap();
    db::save_user_deck(&conn, &deck("u", "U")).unwrap();

    let catalog = DeckCatalog::load(dir.path(), &conn).unwrap();
    assert!(catalog.get("s").is_some());
    assert!(catalog.get("u").unwrap().is_user_deck);
  }
}
