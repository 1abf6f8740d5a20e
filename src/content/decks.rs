//! Deck file parsing and validation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::domain::Deck;
use crate::validation::check_choice_card;

#[derive(Debug)]
pub enum DeckError {
  IoError(String, String),
  ParseError(String, String),
  ValidationError(String, String),
}

impl std::fmt::Display for DeckError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DeckError::IoError(path, err) => write!(f, "IO error reading {}: {}", path, err),
      DeckError::ParseError(path, err) => write!(f, "Parse error in {}: {}", path, err),
      DeckError::ValidationError(id, err) => {
        write!(f, "Validation error for deck '{}': {}", id, err)
      }
    }
  }
}

impl DeckError {
  /// Returns a user-facing error message without exposing filesystem paths.
  pub fn user_message(&self) -> String {
    match self {
      DeckError::IoError(_, _) => "Failed to read deck file".to_string(),
      DeckError::ParseError(_, err) => format!("Failed to parse deck: {}", err),
      DeckError::ValidationError(_, err) => err.clone(),
    }
  }
}

impl std::error::Error for DeckError {}

/// Load and validate a deck from a JSON file.
pub fn load_deck_file(path: &Path) -> Result<Deck, DeckError> {
  let display = path.display().to_string();
  let content = fs::read_to_string(path).map_err(|e| DeckError::IoError(display.clone(), e.to_string()))?;
  let deck: Deck = serde_json::from_str(&content).map_err(|e| DeckError::ParseError(display, e.to_string()))?;
  validate_deck(&deck)?;
  Ok(deck)
}

/// Deck ids appear in URLs and database keys
fn is_valid_deck_id(id: &str) -> bool {
  !id.is_empty()
    && id.len() <= 64
    && id
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check a deck's structure.
///
/// - id is non-empty and URL safe
/// - every card has a unique, non-empty `cardId`
/// - choice cards have a `correctAnswer` matching one of their options
pub fn validate_deck(deck: &Deck) -> Result<(), DeckError> {
  let fail = |msg: String| Err(DeckError::ValidationError(deck.id.clone(), msg));

  if !is_valid_deck_id(&deck.id) {
    return fail("deck id must be 1-64 letters, digits, '_' or '-'".to_string());
  }
  if deck.name.trim().is_empty() {
    return fail("deck name is required".to_string());
  }

  let mut seen = HashSet::new();
  for (i, card) in deck.cards.iter().enumerate() {
    if card.card_id.trim().is_empty() {
      return fail(format!("card #{} has no cardId", i + 1));
    }
    if !seen.insert(card.card_id.as_str()) {
      return fail(format!("duplicate cardId '{}'", card.card_id));
    }
    if deck.deck_type.is_choice() {
      if let Err(problem) = check_choice_card(card) {
        return fail(format!("card '{}': {}", card.card_id, problem));
      }
    }
  }
  Ok(())
}

/// Prepare a deck submitted for import: assign `{deckId}_{n}` ids to cards
/// without one, then validate.
pub fn prepare_import(mut deck: Deck) -> Result<Deck, DeckError> {
  let taken: HashSet<String> = deck
    .cards
    .iter()
    .filter(|c| !c.card_id.trim().is_empty())
    .map(|c| c.card_id.clone())
    .collect();

  let mut next = 1;
  for card in deck.cards.iter_mut().filter(|c| c.card_id.trim().is_empty()) {
    let mut id = format!("{}_{:03}", deck.id, next);
    while taken.contains(&id) {
      next += 1;
      id = format!("{}_{:03}", deck.id, next);
    }
    card.card_id = id;
    next += 1;
  }

  deck.is_user_deck = true;
  deck.locked = false;
  validate_deck(&deck)?;
  Ok(deck)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Card, DeckType};

  fn choice_deck(cards: Vec<Card>) -> Deck {
    Deck::new("sql_basics", "SQL Basics", DeckType::MultipleChoice, cards)
  }

  #[test]
  fn test_valid_deck() {
    let deck = choice_deck(vec![
      Card::choice("q1", "Keyword to filter rows?", &["WHERE", "ORDER BY"], "WHERE"),
      Card::choice("q2", "Keyword to sort?", &["WHERE", "ORDER BY"], "ORDER BY"),
    ]);
    assert!(validate_deck(&deck).is_ok());
  }

  #[test]
  fn test_rejects_bad_deck_id() {
    let mut deck = choice_deck(vec![]);
    deck.id = "../etc".to_string();
    assert!(matches!(validate_deck(&deck), Err(DeckError::ValidationError(_, _))));
    deck.id = String::new();
    assert!(validate_deck(&deck).is_err());
  }

  #[test]
  fn test_rejects_duplicate_card_ids() {
    let deck = choice_deck(vec![
      Card::choice("q1", "a", &["x", "y"], "x"),
      Card::choice("q1", "b", &["x", "y"], "y"),
    ]);
    let err = validate_deck(&deck).unwrap_err();
    assert!(err.to_string().contains("duplicate cardId 'q1'"));
  }

  #[test]
  fn test_rejects_answer_outside_options() {
    let deck = choice_deck(vec![Card::choice("q1", "a", &["x", "y"], "z")]);
    let err = validate_deck(&deck).unwrap_err();
    assert!(err.user_message().contains("q1"));
  }

  #[test]
  fn test_flippable_cards_need_no_answer() {
    let deck = Deck::new(
      "verbs",
      "Verbs",
      DeckType::Flippable,
      vec![Card::flippable("v1", "to run", &["correr"])],
    );
    assert!(validate_deck(&deck).is_ok());
  }

  #[test]
  fn test_prepare_import_assigns_missing_ids() {
    let deck = Deck::new(
      "mine",
      "Mine",
      DeckType::Flippable,
      vec![
        Card::flippable("", "a", &["a"]),
        Card::flippable("mine_002", "kept", &["kept"]),
        Card::flippable("", "b", &["b"]),
      ],
    );

    let deck = prepare_import(deck).unwrap();
    let ids: Vec<&str> = deck.cards.iter().map(|c| c.card_id.as_str()).collect();
    assert_eq!(ids, vec!["mine_001", "mine_002", "mine_003"]);
    assert!(deck.is_user_deck);
  }

  #[test]
  fn test_load_deck_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("git.json");
    std::fs::write(
      &path,
      r#"{"id": "git", "name": "Git", "deckType": "flippable",
          "cards": [{"cardId": "g1", "sideA": "git init", "sideB": ["create a repository"]}]}"#,
    )
    .unwrap();

    let deck = load_deck_file(&path).unwrap();
    assert_eq!(deck.deck_type, DeckType::Flippable);
    assert_eq!(deck.cards.len(), 1);

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_deck_file(&path), Err(DeckError::ParseError(_, _))));
    assert!(matches!(
      load_deck_file(&dir.path().join("missing.json")),
      Err(DeckError::IoError(_, _))
    ));
  }
}
