//! User-created decks and unlocked static decks.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::Deck;

/// Insert or replace a user deck
pub fn save_user_deck(conn: &Connection, deck: &Deck) -> Result<()> {
  let json =
    serde_json::to_string(deck).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
  let now = Utc::now().to_rfc3339();
  conn.execute(
    r#"
    INSERT INTO user_decks (id, name, deck_json, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?4)
    ON CONFLICT(id) DO UPDATE SET
      name = excluded.name,
      deck_json = excluded.deck_json,
      updated_at = excluded.updated_at
    "#,
    params![deck.id, deck.name, json, now],
  )?;
  Ok(())
}

/// All user decks. Rows that no longer parse are logged and skipped.
pub fn get_user_decks(conn: &Connection) -> Result<Vec<Deck>> {
  let mut stmt = conn.prepare("SELECT id, deck_json FROM user_decks ORDER BY created_at, id")?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

  let mut decks = Vec::new();
  for row in rows {
    let (id, json) = row?;
    match serde_json::from_str::<Deck>(&json) {
      Ok(mut deck) => {
        deck.is_user_deck = true;
        decks.push(deck);
      }
      Err(e) => tracing::warn!("Skipping unreadable user deck {}: {}", id, e),
    }
  }
  Ok(decks)
}

pub fn get_user_deck(conn: &Connection, deck_id: &str) -> Result<Option<Deck>> {
  let json: Option<String> = conn
    .query_row(
      "SELECT deck_json FROM user_decks WHERE id = ?1",
      params![deck_id],
      |row| row.get(0),
    )
    .optional()?;

  Ok(json.and_then(|json| match serde_json::from_str::<Deck>(&json) {
    Ok(mut deck) => {
      deck.is_user_deck = true;
      Some(deck)
    }
    Err(e) => {
      tracing::warn!("Unreadable user deck {}: {}", deck_id, e);
      None
    }
  }))
}

/// What happens to a deck's progress, saved round, marks and stats when its
/// user deck row goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckData {
  /// The deck is gone for good
  Purge,
  /// A static deck of the same id takes over again
  Keep,
}

/// Delete a user deck, and its data unless told to keep it, in one
/// transaction. Returns false if no such deck existed.
pub fn delete_user_deck(conn: &Connection, deck_id: &str, data: DeckData) -> Result<bool> {
  let tx = conn.unchecked_transaction()?;
  let deleted = tx.execute("DELETE FROM user_decks WHERE id = ?1", params![deck_id])? > 0;
  if deleted && data == DeckData::Purge {
    for table in ["card_progress", "round_state", "improvement_marks", "card_stats"] {
      tx.execute(&format!("DELETE FROM {} WHERE deck_id = ?1", table), params![deck_id])?;
    }
  }
  tx.commit()?;
  Ok(deleted)
}

pub fn unlock_deck(conn: &Connection, deck_id: &str) -> Result<()> {
  conn.execute(
    "INSERT OR IGNORE INTO unlocked_decks (deck_id, unlocked_at) VALUES (?1, ?2)",
    params![deck_id, Utc::now().to_rfc3339()],
  )?;
  Ok(())
}

pub fn is_deck_unlocked(conn: &Connection, deck_id: &str) -> Result<bool> {
  conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM unlocked_decks WHERE deck_id = ?1)",
    params![deck_id],
    |row| row.get(0),
  )
}
