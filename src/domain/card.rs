use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a card, unique within its deck.
pub type CardId = String;

/// Which study flow a deck uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DeckType {
  /// Pick the correct option out of several
  #[default]
  MultipleChoice,
  /// Self-assessed front/back cards
  Flippable,
  /// Listen to a sentence and pick the missing part
  AudioChoice,
}

impl DeckType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice => "multipleChoice",
      Self::Flippable => "flippable",
      Self::AudioChoice => "audioChoice",
    }
  }

  /// True for deck types answered by picking one of the card's options.
  pub fn is_choice(&self) -> bool {
    matches!(self, Self::MultipleChoice | Self::AudioChoice)
  }
}

/// A single unit of study content.
///
/// Only `cardId`, `options` and `correctAnswer` carry meaning for the study
/// logic. Everything else (question text, sides, hints, audio sources) is kept
/// verbatim in `fields` so decks survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  #[serde(rename = "cardId", default)]
  pub card_id: CardId,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub options: Vec<String>,
  #[serde(
    rename = "correctAnswer",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub correct_answer: Option<String>,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Card {
  /// Create a multiple choice card.
  pub fn choice(card_id: &str, question: &str, options: &[&str], correct_answer: &str) -> Self {
    let mut fields = Map::new();
    fields.insert("question".to_string(), Value::String(question.to_string()));
    Self {
      card_id: card_id.to_string(),
      options: options.iter().map(|o| o.to_string()).collect(),
      correct_answer: Some(correct_answer.to_string()),
      fields,
    }
  }

  /// Create a self-assessed card with a front and one or more back lines.
  pub fn flippable(card_id: &str, side_a: &str, side_b: &[&str]) -> Self {
    let mut fields = Map::new();
    fields.insert("sideA".to_string(), Value::String(side_a.to_string()));
    fields.insert(
      "sideB".to_string(),
      Value::Array(side_b.iter().map(|s| Value::String(s.to_string())).collect()),
    );
    Self {
      card_id: card_id.to_string(),
      options: Vec::new(),
      correct_answer: None,
      fields,
    }
  }

  /// Short human-readable label for lists (question, front side, or the id).
  pub fn label(&self) -> String {
    if let Some(Value::String(q)) = self.fields.get("question") {
      return q.clone();
    }
    if let Some(Value::String(a)) = self.fields.get("sideA") {
      return a.clone();
    }
    if let Some(Value::Object(parts)) = self.fields.get("sentenceParts") {
      let prefix = parts.get("prefix").and_then(Value::as_str).unwrap_or_default();
      let suffix = parts.get("suffix").and_then(Value::as_str).unwrap_or_default();
      return format!("{}___{}", prefix, suffix);
    }
    self.card_id.clone()
  }
}

/// An ordered collection of cards studied together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub deck_type: DeckType,
  #[serde(default)]
  pub cards: Vec<Card>,
  /// Static decks can ship locked behind an unlock code
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub locked: bool,
  /// Set for decks created by the user rather than shipped as files
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub is_user_deck: bool,
}

impl Deck {
  pub fn new(id: &str, name: &str, deck_type: DeckType, cards: Vec<Card>) -> Self {
    Self {
      id: id.to_string(),
      name: name.to_string(),
      description: String::new(),
      deck_type,
      cards,
      locked: false,
      is_user_deck: false,
    }
  }

  pub fn card(&self, card_id: &str) -> Option<&Card> {
    self.cards.iter().find(|c| c.card_id == card_id)
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }
}
