//! Per-card answer statistics

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};
use serde::Serialize;

use super::{try_lock, DbPool, LogOnError};
use crate::srs::CardMetrics;

/// Answer history of one card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
  pub card_id: String,
  pub total_attempts: i64,
  pub total_correct: i64,
  /// Consecutive correct answers, reset by a miss
  pub current_streak: i64,
  /// Share of correct answers, 0.0 to 1.0
  pub success_rate: f64,
  pub last_attempt_at: Option<DateTime<Utc>>,
}

fn success_rate(total_correct: i64, total_attempts: i64) -> f64 {
  if total_attempts > 0 {
    total_correct as f64 / total_attempts as f64
  } else {
    0.0
  }
}

/// Update card stats after an answer
pub fn record_card_attempt(conn: &Connection, deck_id: &str, card_id: &str, is_correct: bool) -> Result<()> {
  let now = Utc::now().to_rfc3339();
  let correct_increment = if is_correct { 1 } else { 0 };

  conn.execute(
    r#"
    INSERT INTO card_stats
      (deck_id, card_id, total_attempts, total_correct, current_streak, last_attempt_at)
    VALUES (?1, ?2, 1, ?3, ?3, ?4)
    ON CONFLICT(deck_id, card_id) DO UPDATE SET
      total_attempts = total_attempts + 1,
      total_correct = total_correct + ?3,
      current_streak = CASE WHEN ?3 = 1 THEN current_streak + 1 ELSE 0 END,
      last_attempt_at = ?4
    "#,
    params![deck_id, card_id, correct_increment, now],
  )?;
  Ok(())
}

/// Stats for every card of a deck that has been answered at least once
pub fn get_card_stats(conn: &Connection, deck_id: &str) -> Result<Vec<CardStats>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT card_id, total_attempts, total_correct, current_streak, last_attempt_at
    FROM card_stats
    WHERE deck_id = ?1
    ORDER BY card_id
    "#,
  )?;
  let stats = stmt
    .query_map(params![deck_id], |row| {
      let total_attempts: i64 = row.get(1)?;
      let total_correct: i64 = row.get(2)?;
      let last: Option<String> = row.get(4)?;
      Ok(CardStats {
        card_id: row.get(0)?,
        total_attempts,
        total_correct,
        current_streak: row.get(3)?,
        success_rate: success_rate(total_correct, total_attempts),
        last_attempt_at: last
          .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
          .map(|dt| dt.with_timezone(&Utc)),
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(stats)
}

/// `CardMetrics` that writes to the `card_stats` table. Failures are logged.
#[derive(Clone)]
pub struct SqliteCardMetrics {
  pool: DbPool,
}

impl SqliteCardMetrics {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

impl CardMetrics for SqliteCardMetrics {
  fn record_answer(&self, deck_id: &str, card_id: &str, correct: bool) {
    let Some(conn) = try_lock(&self.pool).log_warn("Card metrics skipped") else {
      return;
    };
    record_card_attempt(&conn, deck_id, card_id, correct).log_warn("Failed to record card attempt");
  }
}
