//! Picks the cards for the next study round.
//!
//! Cards that need review are listed ahead of cards never seen, then the whole
//! candidate list is shuffled and truncated. Review cards are not weighted, so
//! once a deck has more candidates than the round length the two pools compete
//! on equal terms.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::domain::{Card, Progress};

/// Cards per round when the caller does not ask for a specific length
pub const DEFAULT_ROUND_LENGTH: usize = 7;

/// Convert a caller supplied round length to a usable one. Zero and negative
/// lengths produce an empty round.
pub fn clamp_round_length(requested: i64) -> usize {
  usize::try_from(requested).unwrap_or(0)
}

/// Select up to `round_length` cards for the next round.
///
/// Never returns an ignored card. An empty result means every non-ignored
/// card is learned.
pub fn select_round<R: Rng + ?Sized>(
  cards: &[Card],
  progress: &Progress,
  round_length: usize,
  rng: &mut R,
) -> Vec<Card> {
  let studyable: HashMap<&str, &Card> = cards
    .iter()
    .filter(|c| !progress.is_ignored(&c.card_id))
    .map(|c| (c.card_id.as_str(), c))
    .collect();

  let mut candidates: Vec<&str> = progress.needs_review().iter().map(String::as_str).collect();
  candidates.extend(
    cards
      .iter()
      .filter(|c| studyable.contains_key(c.card_id.as_str()) && !progress.is_seen(&c.card_id))
      .map(|c| c.card_id.as_str()),
  );

  candidates.shuffle(rng);

  // Stale ids (no longer in the deck, or ignored) are dropped after truncation
  candidates
    .into_iter()
    .take(round_length)
    .filter_map(|id| studyable.get(id).map(|card| (*card).clone()))
    .collect()
}
