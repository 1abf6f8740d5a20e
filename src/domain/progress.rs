//! Per-deck study progress.
//!
//! Card ids are partitioned into `learned` and `needs_review`, with `ignored`
//! as an exclusion set on top. Cards in none of the sets are new. The
//! mutators keep `learned` and `needs_review` disjoint, and ignoring a card
//! drops any mastery tracking for it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::card::{CardId, Deck};

/// Mastery state of a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
  New,
  Learned,
  NeedsReview,
  Ignored,
}

impl CardState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learned => "learned",
      Self::NeedsReview => "needs_review",
      Self::Ignored => "ignored",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
  #[serde(default)]
  learned: BTreeSet<CardId>,
  #[serde(default)]
  needs_review: BTreeSet<CardId>,
  #[serde(default)]
  ignored: BTreeSet<CardId>,
}

impl Progress {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a progress record from raw sets, restoring the invariants.
  ///
  /// A card found in both `learned` and `needs_review` is kept as needing
  /// review; ignored cards lose their mastery tracking.
  pub fn from_sets<L, R, I>(learned: L, needs_review: R, ignored: I) -> Self
  where
    L: IntoIterator<Item = CardId>,
    R: IntoIterator<Item = CardId>,
    I: IntoIterator<Item = CardId>,
  {
    let mut progress = Self::new();
    for id in learned {
      progress.learned.insert(id);
    }
    for id in needs_review {
      progress.learned.remove(&id);
      progress.needs_review.insert(id);
    }
    for id in ignored {
      progress.ignore(&id);
    }
    progress
  }

  pub fn learned(&self) -> &BTreeSet<CardId> {
    &self.learned
  }

  pub fn needs_review(&self) -> &BTreeSet<CardId> {
    &self.needs_review
  }

  pub fn ignored(&self) -> &BTreeSet<CardId> {
    &self.ignored
  }

  pub fn is_learned(&self, card_id: &str) -> bool {
    self.learned.contains(card_id)
  }

  pub fn is_in_review(&self, card_id: &str) -> bool {
    self.needs_review.contains(card_id)
  }

  pub fn is_ignored(&self, card_id: &str) -> bool {
    self.ignored.contains(card_id)
  }

  /// True if the card has been answered at least once (learned or in review).
  pub fn is_seen(&self, card_id: &str) -> bool {
    self.is_learned(card_id) || self.is_in_review(card_id)
  }

  pub fn state_of(&self, card_id: &str) -> CardState {
    if self.is_ignored(card_id) {
      CardState::Ignored
    } else if self.is_in_review(card_id) {
      CardState::NeedsReview
    } else if self.is_learned(card_id) {
      CardState::Learned
    } else {
      CardState::New
    }
  }

  /// Record the outcome of an answer or self-assessment.
  pub fn record(&mut self, card_id: &str, correct: bool) {
    self.needs_review.remove(card_id);
    if correct {
      self.learned.insert(card_id.to_string());
    } else {
      self.learned.remove(card_id);
      self.needs_review.insert(card_id.to_string());
    }
  }

  /// Exclude a card from future rounds. Idempotent.
  pub fn ignore(&mut self, card_id: &str) {
    self.learned.remove(card_id);
    self.needs_review.remove(card_id);
    self.ignored.insert(card_id.to_string());
  }

  /// Returns the card to the new pool. Returns false if it was not ignored.
  pub fn unignore(&mut self, card_id: &str) -> bool {
    self.ignored.remove(card_id)
  }

  pub fn clear(&mut self) {
    self.learned.clear();
    self.needs_review.clear();
    self.ignored.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.learned.is_empty() && self.needs_review.is_empty() && self.ignored.is_empty()
  }

  /// Count cards of `deck` per state. Ids that no longer exist in the deck
  /// are not counted.
  pub fn stats(&self, deck: &Deck) -> ProgressStats {
    let mut stats = ProgressStats {
      total: deck.cards.len(),
      ..Default::default()
    };
    for card in &deck.cards {
      match self.state_of(&card.card_id) {
        CardState::New => stats.unseen += 1,
        CardState::Learned => stats.learned += 1,
        CardState::NeedsReview => stats.needs_review += 1,
        CardState::Ignored => stats.ignored += 1,
      }
    }
    stats
  }

  /// Every non-ignored card of the deck is learned.
  pub fn is_mastered(&self, deck: &Deck) -> bool {
    deck
      .cards
      .iter()
      .filter(|c| !self.is_ignored(&c.card_id))
      .all(|c| self.is_learned(&c.card_id) && !self.is_in_review(&c.card_id))
  }
}

/// Per-state card counts for a deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
  pub total: usize,
  pub learned: usize,
  pub needs_review: usize,
  pub ignored: usize,
  pub unseen: usize,
}

impl ProgressStats {
  /// Percentage of the deck that is learned (0-100)
  pub fn percentage(&self) -> u8 {
    if self.total == 0 {
      0
    } else {
      ((self.learned * 100) / self.total) as u8
    }
  }

  pub fn is_complete(&self) -> bool {
    self.learned + self.ignored >= self.total && self.needs_review == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Card, DeckType};

  fn deck_of(n: usize) -> Deck {
    let cards = (1..=n)
      .map(|i| Card::flippable(&format!("c{}", i), "front", &["back"]))
      .collect();
    Deck::new("d", "Deck", DeckType::Flippable, cards)
  }

  fn assert_disjoint(p: &Progress) {
    assert!(p.learned().is_disjoint(p.needs_review()));
  }

  #[test]
  fn test_new_progress_is_empty() {
    let p = Progress::new();
    assert!(p.is_empty());
    assert_eq!(p.state_of("c1"), CardState::New);
  }

  #[test]
  fn test_record_correct_moves_to_learned() {
    let mut p = Progress::new();
    p.record("c1", false);
    assert!(p.is_in_review("c1"));
    p.record("c1", true);
    assert!(p.is_learned("c1"));
    assert!(!p.is_in_review("c1"));
    assert_disjoint(&p);
  }

  #[test]
  fn test_record_incorrect_moves_to_review() {
    let mut p = Progress::new();
    p.record("c1", true);
    p.record("c1", false);
    assert!(p.is_in_review("c1"));
    assert!(!p.is_learned("c1"));
    assert_disjoint(&p);
  }

  #[test]
  fn test_record_correct_twice() {
    let mut p = Progress::new();
    p.record("c1", true);
    assert!(p.is_learned("c1"));
    assert!(!p.is_in_review("c1"));
    p.record("c1", true);
    assert!(p.is_learned("c1"));
    assert!(!p.is_in_review("c1"));
  }

  #[test]
  fn test_ignore_takes_precedence() {
    for prior in [None, Some(true), Some(false)] {
      let mut p = Progress::new();
      if let Some(correct) = prior {
        p.record("c1", correct);
      }
      p.ignore("c1");
      assert!(p.is_ignored("c1"));
      assert!(!p.is_learned("c1"));
      assert!(!p.is_in_review("c1"));
      assert_eq!(p.state_of("c1"), CardState::Ignored);
    }
  }

  #[test]
  fn test_ignore_is_idempotent() {
    let mut once = Progress::new();
    once.record("c1", true);
    once.ignore("c1");

    let mut twice = once.clone();
    twice.ignore("c1");
    assert_eq!(once, twice);
  }

  #[test]
  fn test_unignore_returns_card_to_new() {
    let mut p = Progress::new();
    p.record("c1", true);
    p.ignore("c1");
    assert!(p.unignore("c1"));
    assert_eq!(p.state_of("c1"), CardState::New);
    assert!(!p.unignore("c1"));
  }

  #[test]
  fn test_from_sets_restores_invariants() {
    let p = Progress::from_sets(
      vec!["a".to_string(), "b".to_string(), "c".to_string()],
      vec!["b".to_string(), "d".to_string()],
      vec!["c".to_string()],
    );
    assert_disjoint(&p);
    assert_eq!(p.state_of("a"), CardState::Learned);
    assert_eq!(p.state_of("b"), CardState::NeedsReview);
    assert_eq!(p.state_of("c"), CardState::Ignored);
    assert!(!p.is_learned("c"));
  }

  #[test]
  fn test_serde_uses_camel_case_and_tolerates_missing_ignored() {
    let p: Progress = serde_json::from_str(r#"{"learned": ["a"], "needsReview": ["b"]}"#).unwrap();
    assert!(p.is_learned("a"));
    assert!(p.is_in_review("b"));
    assert!(p.ignored().is_empty());

    let json = serde_json::to_value(&p).unwrap();
    assert!(json.get("needsReview").is_some());
    assert!(json.get("ignored").is_some());
  }

  #[test]
  fn test_stats_counts_each_state() {
    let deck = deck_of(10);
    let mut p = Progress::new();
    p.record("c1", true);
    p.record("c2", true);
    p.record("c3", false);
    p.ignore("c4");
    p.record("stale", true);

    let stats = p.stats(&deck);
    assert_eq!(stats.total, 10);
    assert_eq!(stats.learned, 2);
    assert_eq!(stats.needs_review, 1);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.unseen, 6);
    assert_eq!(stats.percentage(), 20);
    assert!(!stats.is_complete());
  }

  #[test]
  fn test_mastery_ignores_ignored_cards() {
    let deck = deck_of(3);
    let mut p = Progress::new();
    p.record("c1", true);
    p.record("c2", true);
    assert!(!p.is_mastered(&deck));
    p.ignore("c3");
    assert!(p.is_mastered(&deck));
    assert!(p.stats(&deck).is_complete());
  }

  #[test]
  fn test_clear() {
    let mut p = Progress::new();
    p.record("c1", true);
    p.ignore("c2");
    p.clear();
    assert!(p.is_empty());
  }

  #[test]
  fn test_stats_percentage_empty_deck() {
    let stats = ProgressStats::default();
    assert_eq!(stats.percentage(), 0);
    assert!(stats.is_complete());
  }
}
