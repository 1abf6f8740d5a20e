//! Improvement requests attached to cards.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::domain::ImprovementMark;

/// Mark a card for improvement, replacing any earlier request for it
pub fn mark_for_improvement(conn: &Connection, deck_id: &str, card_id: &str, request: &str) -> Result<()> {
  conn.execute(
    r#"
    INSERT INTO improvement_marks (deck_id, card_id, request, marked_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(deck_id, card_id) DO UPDATE SET
      request = excluded.request,
      marked_at = excluded.marked_at
    "#,
    params![deck_id, card_id, request, Utc::now().to_rfc3339()],
  )?;
  Ok(())
}

/// Returns false if the card was not marked
pub fn unmark_improvement(conn: &Connection, deck_id: &str, card_id: &str) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM improvement_marks WHERE deck_id = ?1 AND card_id = ?2",
    params![deck_id, card_id],
  )?;
  Ok(deleted > 0)
}

/// Returns the number of marks removed
pub fn clear_improvement_marks(conn: &Connection, deck_id: &str) -> Result<usize> {
  conn.execute("DELETE FROM improvement_marks WHERE deck_id = ?1", params![deck_id])
}

/// Marks for a deck, oldest first
pub fn get_improvement_marks(conn: &Connection, deck_id: &str) -> Result<Vec<ImprovementMark>> {
  let mut stmt = conn.prepare(
    "SELECT card_id, request, marked_at FROM improvement_marks WHERE deck_id = ?1 ORDER BY marked_at, card_id",
  )?;
  let marks = stmt
    .query_map(params![deck_id], |row| {
      let marked_at: String = row.get(2)?;
      Ok(ImprovementMark {
        card_id: row.get(0)?,
        request: row.get(1)?,
        marked_at: DateTime::parse_from_rfc3339(&marked_at)
          .map(|dt| dt.with_timezone(&Utc))
          .unwrap_or_else(|_| Utc::now()),
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(marks)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::open_in_memory;

  #[test]
  fn test_mark_and_list() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    mark_for_improvement(&conn, "d", "c1", "add an example").unwrap();
    mark_for_improvement(&conn, "d", "c2", "typo in option B").unwrap();
    mark_for_improvement(&conn, "other", "c1", "unrelated").unwrap();

    let marks = get_improvement_marks(&conn, "d").unwrap();
    assert_eq!(marks.len(), 2);
    assert!(marks.iter().any(|m| m.card_id == "c2" && m.request == "typo in option B"));
  }

  #[test]
  fn test_remark_replaces_request() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    mark_for_improvement(&conn, "d", "c1", "first").unwrap();
    mark_for_improvement(&conn, "d", "c1", "second").unwrap();

    let marks = get_improvement_marks(&conn, "d").unwrap();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].request, "second");
  }

  #[test]
  fn test_unmark_and_clear() {
    let pool = open_in_memory().unwrap();
    let conn = pool.lock().unwrap();

    mark_for_improvement(&conn, "d", "c1", "x").unwrap();
    mark_for_improvement(&conn, "d", "c2", "y").unwrap();
    assert!(unmark_improvement(&conn, "d", "c1").unwrap());
    assert!(!unmark_improvement(&conn, "d", "c1").unwrap());
    assert_eq!(clear_improvement_marks(&conn, "d").unwrap(), 1);
    assert!(get_improvement_marks(&conn, "d").unwrap().is_empty());
  }
}
