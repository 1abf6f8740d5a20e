use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    -- One row per tracked card; cards with no row are new
    CREATE TABLE IF NOT EXISTS card_progress (
      deck_id TEXT NOT NULL,
      card_id TEXT NOT NULL,
      state TEXT NOT NULL CHECK (state IN ('learned', 'needs_review', 'ignored')),
      updated_at TEXT NOT NULL,
      PRIMARY KEY (deck_id, card_id)
    );

    CREATE TABLE IF NOT EXISTS round_state (
      deck_id TEXT PRIMARY KEY,
      card_ids TEXT NOT NULL,
      current_index INTEGER NOT NULL DEFAULT 0,
      score INTEGER NOT NULL DEFAULT 0,
      current_scored INTEGER NOT NULL DEFAULT 0,
      saved_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS user_decks (
      id TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      deck_json TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS unlocked_decks (
      deck_id TEXT PRIMARY KEY,
      unlocked_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS improvement_marks (
      deck_id TEXT NOT NULL,
      card_id TEXT NOT NULL,
      request TEXT NOT NULL,
      marked_at TEXT NOT NULL,
      PRIMARY KEY (deck_id, card_id)
    );

    CREATE TABLE IF NOT EXISTS card_stats (
      deck_id TEXT NOT NULL,
      card_id TEXT NOT NULL,
      total_attempts INTEGER NOT NULL DEFAULT 0,
      total_correct INTEGER NOT NULL DEFAULT 0,
      current_streak INTEGER NOT NULL DEFAULT 0,
      last_attempt_at TEXT,
      PRIMARY KEY (deck_id, card_id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_card_progress_state ON card_progress(deck_id, state);
    CREATE INDEX IF NOT EXISTS idx_improvement_marks_deck ON improvement_marks(deck_id, marked_at);
    "#,
  )?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
    let tables: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
         ('card_progress', 'round_state', 'user_decks', 'unlocked_decks', 'improvement_marks', 'card_stats')",
        [],
        |row| row.get(0),
      )
      .unwrap();
    assert_eq!(tables, 6);
  }

  #[test]
  fn test_card_progress_rejects_unknown_state() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let result = conn.execute(
      "INSERT INTO card_progress (deck_id, card_id, state, updated_at) VALUES ('d', 'c', 'new', 'now')",
      [],
    );
    assert!(result.is_err());
  }
}
