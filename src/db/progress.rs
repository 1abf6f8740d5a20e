//! Deck progress and saved rounds.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{try_lock, DbPool};
use crate::domain::{CardState, Progress};
use crate::srs::{ProgressStore, RoundSnapshot, StoreError};

/// Load the progress record of a deck (empty if never studied)
pub fn load_progress(conn: &Connection, deck_id: &str) -> Result<Progress> {
  let mut stmt = conn.prepare("SELECT card_id, state FROM card_progress WHERE deck_id = ?1")?;
  let rows = stmt.query_map(params![deck_id], |row| {
    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
  })?;

  let mut learned = Vec::new();
  let mut needs_review = Vec::new();
  let mut ignored = Vec::new();
  for row in rows {
    let (card_id, state) = row?;
    match state.as_str() {
      "learned" => learned.push(card_id),
      "needs_review" => needs_review.push(card_id),
      "ignored" => ignored.push(card_id),
      other => tracing::warn!("Unknown card state '{}' for {}/{}", other, deck_id, card_id),
    }
  }
  Ok(Progress::from_sets(learned, needs_review, ignored))
}

/// Replace the stored progress of a deck
pub fn save_progress(conn: &Connection, deck_id: &str, progress: &Progress) -> Result<()> {
  let now = Utc::now().to_rfc3339();
  let tx = conn.unchecked_transaction()?;
  tx.execute("DELETE FROM card_progress WHERE deck_id = ?1", params![deck_id])?;
  {
    let mut stmt = tx.prepare(
      "INSERT INTO card_progress (deck_id, card_id, state, updated_at) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let tracked = progress
      .learned()
      .iter()
      .chain(progress.needs_review())
      .chain(progress.ignored());
    for card_id in tracked {
      let state = progress.state_of(card_id);
      if state != CardState::New {
        stmt.execute(params![deck_id, card_id, state.as_str(), now])?;
      }
    }
  }
  tx.commit()
}

pub fn clear_progress(conn: &Connection, deck_id: &str) -> Result<()> {
  conn.execute("DELETE FROM card_progress WHERE deck_id = ?1", params![deck_id])?;
  Ok(())
}

pub fn save_round(conn: &Connection, snapshot: &RoundSnapshot) -> std::result::Result<(), StoreError> {
  let card_ids = serde_json::to_string(&snapshot.card_ids)?;
  conn.execute(
    r#"
    INSERT INTO round_state (deck_id, card_ids, current_index, score, current_scored, saved_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(deck_id) DO UPDATE SET
      card_ids = excluded.card_ids,
      current_index = excluded.current_index,
      score = excluded.score,
      current_scored = excluded.current_scored,
      saved_at = excluded.saved_at
    "#,
    params![
      snapshot.deck_id,
      card_ids,
      snapshot.current_index as i64,
      snapshot.score as i64,
      snapshot.current_scored,
      Utc::now().to_rfc3339()
    ],
  )?;
  Ok(())
}

pub fn load_round(conn: &Connection, deck_id: &str) -> std::result::Result<Option<RoundSnapshot>, StoreError> {
  let row = conn
    .query_row(
      "SELECT card_ids, current_index, score, current_scored FROM round_state WHERE deck_id = ?1",
      params![deck_id],
      |row| {
        Ok((
          row.get::<_, String>(0)?,
          row.get::<_, i64>(1)?,
          row.get::<_, i64>(2)?,
          row.get::<_, bool>(3)?,
        ))
      },
    )
    .optional()?;

  let Some((card_ids, current_index, score, current_scored)) = row else {
    return Ok(None);
  };
  Ok(Some(RoundSnapshot {
    deck_id: deck_id.to_string(),
    card_ids: serde_json::from_str(&card_ids)?,
    current_index: current_index.max(0) as usize,
    score: score.max(0) as usize,
    current_scored,
  }))
}

pub fn clear_round(conn: &Connection, deck_id: &str) -> Result<()> {
  conn.execute("DELETE FROM round_state WHERE deck_id = ?1", params![deck_id])?;
  Ok(())
}

/// `ProgressStore` backed by the shared SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

impl ProgressStore for SqliteStore {
  fn load_progress(&self, deck_id: &str) -> std::result::Result<Progress, StoreError> {
    let conn = try_lock(&self.pool)?;
    Ok(load_progress(&conn, deck_id)?)
  }

  fn save_progress(&self, deck_id: &str, progress: &Progress) -> std::result::Result<(), StoreError> {
    let conn = try_lock(&self.pool)?;
    Ok(save_progress(&conn, deck_id, progress)?)
  }

  fn clear_progress(&self, deck_id: &str) -> std::result::Result<(), StoreError> {
    let conn = try_lock(&self.pool)?;
    Ok(clear_progress(&conn, deck_id)?)
  }

  fn save_round(&self, snapshot: &RoundSnapshot) -> std::result::Result<(), StoreError> {
    let conn = try_lock(&self.pool)?;
    save_round(&conn, snapshot)
  }

  fn load_round(&self, deck_id: &str) -> std::result::Result<Option<RoundSnapshot>, StoreError> {
    let conn = try_lock(&self.pool)?;
    load_round(&conn, deck_id)
  }

  fn clear_round(&self, deck_id: &str) -> std::result::Result<(), StoreError> {
    let conn = try_lock(&self.pool)?;
    Ok(clear_round(&conn, deck_id)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::open_in_memory;

  #[test]
  fn test_progress_round_trip() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    let mut p = Progress::new();
    p.record("a", true);
    p.record("b", false);
    p.ignore("c");
    save_progress(&conn, "deck", &p).unwrap();

    let loaded = load_progress(&conn, "deck").unwrap();
    assert_eq!(loaded, p);
    assert!(load_progress(&conn, "other").unwrap().is_empty());
  }

  #[test]
  fn test_save_progress_replaces_previous_state() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    let mut p = Progress::new();
    p.record("a", false);
    save_progress(&conn, "deck", &p).unwrap();
    p.record("a", true);
    save_progress(&conn, "deck", &p).unwrap();

    let loaded = load_progress(&conn, "deck").unwrap();
    assert!(loaded.is_learned("a"));
    assert!(!loaded.is_in_review("a"));
  }

  #[test]
  fn test_clear_progress_only_touches_one_deck() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    let mut p = Progress::new();
    p.record("a", true);
    save_progress(&conn, "one", &p).unwrap();
    save_progress(&conn, "two", &p).unwrap();

    clear_progress(&conn, "one").unwrap();
    assert!(load_progress(&conn, "one").unwrap().is_empty());
    assert!(load_progress(&conn, "two").unwrap().is_learned("a"));
  }

  #[test]
  fn test_round_snapshot_upsert() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    let mut snapshot = RoundSnapshot {
      deck_id: "deck".to_string(),
      card_ids: vec!["x".to_string(), "y".to_string()],
      current_index: 0,
      score: 0,
      current_scored: false,
    };
    save_round(&conn, &snapshot).unwrap();
    snapshot.current_index = 1;
    snapshot.score = 1;
    snapshot.current_scored = true;
    save_round(&conn, &snapshot).unwrap();

    assert_eq!(load_round(&conn, "deck").unwrap(), Some(snapshot));
    clear_round(&conn, "deck").unwrap();
    assert_eq!(load_round(&conn, "deck").unwrap(), None);
  }

  #[test]
  fn test_corrupt_round_is_reported() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();
    conn
      .execute(
        "INSERT INTO round_state (deck_id, card_ids, saved_at) VALUES ('deck', 'not json', 'now')",
        [],
      )
      .unwrap();
    assert!(matches!(load_round(&conn, "deck"), Err(StoreError::Corrupt(_))));
  }

  #[test]
  fn test_sqlite_store_implements_port() {
    let store = SqliteStore::new(open_in_memory().unwrap());
    let mut p = Progress::new();
    p.record("a", true);
    store.save_progress("deck", &p).unwrap();
    assert!(store.load_progress("deck").unwrap().is_learned("a"));
    store.clear_progress("deck").unwrap();
    assert!(store.load_progress("deck").unwrap().is_empty());
  }
}
