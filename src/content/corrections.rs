//! Applying a batch of corrected cards to a deck.

use serde::Serialize;
use serde_json::Value;

use crate::domain::{Card, CardId, Deck};

/// What happened to each card of a corrections batch.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionReport {
  pub updated: Vec<CardId>,
  /// Ids not present in the deck
  pub unknown: Vec<CardId>,
  /// Entries that were not a card object or had no `cardId`
  pub invalid: usize,
}

/// Replace cards of `deck` by `cardId` with the corrected versions.
///
/// Card order is preserved. Any `review_request` attached by the export is
/// dropped. Entries for unknown ids are skipped and reported.
pub fn apply_corrections(deck: &mut Deck, corrected: Vec<Value>) -> CorrectionReport {
  let mut report = CorrectionReport::default();

  for mut value in corrected {
    if let Value::Object(ref mut map) = value {
      map.remove("review_request");
    }
    let card: Card = match serde_json::from_value(value) {
      Ok(card) => card,
      Err(e) => {
        tracing::warn!("Skipping correction that is not a card: {}", e);
        report.invalid += 1;
        continue;
      }
    };
    if card.card_id.trim().is_empty() {
      tracing::warn!("Skipping correction without cardId");
      report.invalid += 1;
      continue;
    }

    match deck.cards.iter_mut().find(|c| c.card_id == card.card_id) {
      Some(slot) => {
        tracing::debug!("Deck {}: corrected card {}", deck.id, card.card_id);
        report.updated.push(card.card_id.clone());
        *slot = card;
      }
      None => {
        tracing::warn!("Deck {}: correction for unknown card {}", deck.id, card.card_id);
        report.unknown.push(card.card_id);
      }
    }
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::DeckType;
  use serde_json::json;

  fn deck() -> Deck {
    Deck::new(
      "git",
      "Git",
      DeckType::MultipleChoice,
      vec![
        Card::choice("g1", "Create a repo?", &["git init", "git new"], "git init"),
        Card::choice("g2", "Stage files?", &["git add", "git stage"], "git add"),
        Card::choice("g3", "Commit?", &["git commit", "git save"], "git commit"),
      ],
    )
  }

  #[test]
  fn test_replaces_in_place() {
    let mut d = deck();
    let report = apply_corrections(
      &mut d,
      vec![json!({
        "cardId": "g2",
        "question": "Which command stages changes?",
        "options": ["git add", "git stage", "git push"],
        "correctAnswer": "git add",
        "review_request": {"request": "add a distractor", "markedAt": "2024-01-01T00:00:00Z"}
      })],
    );

    assert_eq!(report.updated, vec!["g2"]);
    let ids: Vec<&str> = d.cards.iter().map(|c| c.card_id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g2", "g3"]);
    assert_eq!(d.cards[1].options.len(), 3);
    assert!(!d.cards[1].fields.contains_key("review_request"));
  }

  #[test]
  fn test_reports_unknown_and_invalid() {
    let mut d = deck();
    let before = d.clone();
    let report = apply_corrections(
      &mut d,
      vec![json!({"cardId": "zzz", "question": "?"}), json!({"question": "no id"}), json!("text")],
    );
    assert!(report.updated.is_empty());
    assert_eq!(report.unknown, vec!["zzz"]);
    assert_eq!(report.invalid, 2);
    assert_eq!(d, before);
  }
}
