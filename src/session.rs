//! Simple in-memory session storage for study rounds.
//!
//! Stores the active round keyed by session ID (from cookie).
//! Sessions auto-expire after a configurable duration of inactivity.

use crate::config;
use crate::srs::ActiveRound;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

/// Session entry with last access time for expiration
struct SessionEntry {
  round: ActiveRound,
  last_access: DateTime<Utc>,
}

/// Global session store
static SESSIONS: LazyLock<Mutex<HashMap<String, SessionEntry>>> =
  LazyLock::new(|| Mutex::new(HashMap::new()));

fn sessions() -> MutexGuard<'static, HashMap<String, SessionEntry>> {
  // A panic mid-update leaves at worst one stale round behind
  SESSIONS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store the round for a session, replacing any previous one
pub fn set_round(session_id: &str, round: ActiveRound) {
  let mut sessions = sessions();

  // Clean up expired sessions occasionally (~10% chance)
  if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
    cleanup_expired(&mut sessions);
  }

  sessions.insert(
    session_id.to_string(),
    SessionEntry {
      round,
      last_access: Utc::now(),
    },
  );
}

/// Run `f` against the session's round. Returns `None` if the session has no
/// round.
pub fn with_round<T>(session_id: &str, f: impl FnOnce(&mut ActiveRound) -> T) -> Option<T> {
  let mut sessions = sessions();
  let entry = sessions.get_mut(session_id)?;
  if entry.last_access < Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS) {
    sessions.remove(session_id);
    return None;
  }
  entry.last_access = Utc::now();
  Some(f(&mut entry.round))
}

/// Remove and return the session's round
pub fn take_round(session_id: &str) -> Option<ActiveRound> {
  sessions().remove(session_id).map(|entry| entry.round)
}

/// Drop every session studying `deck_id`
pub fn end_rounds_for_deck(deck_id: &str) {
  sessions().retain(|_, entry| entry.round.deck_id() != deck_id);
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  sessions.retain(|_, entry| entry.last_access > expiry);
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Card, Deck, DeckType};
  use crate::srs::RoundPorts;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn round(deck_id: &str) -> ActiveRound {
    let deck = Deck::new(deck_id, "D", DeckType::Flippable, vec![Card::flippable("a", "A", &["a"])]);
    ActiveRound::start(&deck, 7, RoundPorts::in_memory(), &mut StdRng::seed_from_u64(1)).unwrap()
  }

  #[test]
  fn test_generate_session_id() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }

  #[test]
  fn test_set_with_take() {
    let sid = generate_session_id();
    assert!(with_round(&sid, |r| r.len()).is_none());

    set_round(&sid, round("deck_a"));
    assert_eq!(with_round(&sid, |r| r.len()), Some(1));
    assert_eq!(with_round(&sid, |r| r.advance()), Some(true));

    let taken = take_round(&sid).unwrap();
    assert!(taken.is_over());
    assert!(take_round(&sid).is_none());
  }

  #[test]
  fn test_end_rounds_for_deck() {
    let a = generate_session_id();
    let b = generate_session_id();
    set_round(&a, round("session_deck_x"));
    set_round(&b, round("session_deck_y"));

    end_rounds_for_deck("session_deck_x");
    assert!(with_round(&a, |_| ()).is_none());
    assert!(with_round(&b, |_| ()).is_some());
    take_round(&b);
  }
}
