//! Cards flagged by the learner as needing better content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::card::{CardId, Deck};

/// A learner's request to improve one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementMark {
  pub card_id: CardId,
  pub request: String,
  pub marked_at: DateTime<Utc>,
}

/// Build the export batch for a deck: each marked card as it currently exists
/// in the deck, with the learner's request attached as `review_request`.
///
/// Marks whose card no longer exists in the deck are skipped.
pub fn build_export_batch(deck: &Deck, marks: &[ImprovementMark]) -> Vec<Value> {
  marks
    .iter()
    .filter_map(|mark| {
      let card = deck.card(&mark.card_id)?;
      let mut value = serde_json::to_value(card).ok()?;
      if let Value::Object(ref mut map) = value {
        map.insert(
          "review_request".to_string(),
          serde_json::json!({
            "request": mark.request,
            "markedAt": mark.marked_at.to_rfc3339(),
          }),
        );
      }
      Some(value)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Card, DeckType};

  fn mark(card_id: &str, request: &str) -> ImprovementMark {
    ImprovementMark {
      card_id: card_id.to_string(),
      request: request.to_string(),
      marked_at: Utc::now(),
    }
  }

  #[test]
  fn test_export_batch_attaches_request() {
    let deck = Deck::new(
      "d",
      "Deck",
      DeckType::MultipleChoice,
      vec![Card::choice("q1", "2+2?", &["3", "4"], "4")],
    );
    let batch = build_export_batch(&deck, &[mark("q1", "explain why")]);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0]["cardId"], "q1");
    assert_eq!(batch[0]["correctAnswer"], "4");
    assert_eq!(batch[0]["review_request"]["request"], "explain why");
  }

  #[test]
  fn test_export_batch_skips_missing_cards() {
    let deck = Deck::new("d", "Deck", DeckType::Flippable, vec![]);
    let batch = build_export_batch(&deck, &[mark("gone", "fix")]);
    assert!(batch.is_empty());
  }
}
