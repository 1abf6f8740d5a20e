//! Answer checking for choice-based cards.
//!
//! A card's `correctAnswer` is the canonical answer. The selected option and
//! the canonical answer are compared after normalization, so option text that
//! differs only in surrounding or repeated whitespace, or in Unicode
//! composition, still counts as the same answer.

use unicode_normalization::UnicodeNormalization;

use crate::domain::Card;

// ============================================================================
// Normalization
// ============================================================================

/// Normalize option text for comparison
/// - Unicode NFC composition
/// - Trims whitespace
/// - Collapses internal runs of whitespace to a single space
pub fn normalize_option(input: &str) -> String {
  input
    .nfc()
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// True if `selection` is the same answer as `expected`.
pub fn answers_match(selection: &str, expected: &str) -> bool {
  normalize_option(selection) == normalize_option(expected)
}

/// Check a selection against a card. Cards without a canonical answer can
/// never be answered correctly.
pub fn check_choice(card: &Card, selection: &str) -> bool {
  card
    .correct_answer
    .as_deref()
    .is_some_and(|expected| answers_match(selection, expected))
}

// ============================================================================
// Card validation
// ============================================================================

/// Problems found on a choice card's answer data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceProblem {
  MissingAnswer,
  AnswerNotInOptions,
  DuplicateOptions,
}

impl std::fmt::Display for ChoiceProblem {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MissingAnswer => write!(f, "missing correctAnswer"),
      Self::AnswerNotInOptions => write!(f, "correctAnswer does not match any option"),
      Self::DuplicateOptions => write!(f, "two options normalize to the same text"),
    }
  }
}

/// Check that a choice card can be answered correctly.
///
/// Cards with no options (free-form audio prompts) only need an answer.
pub fn check_choice_card(card: &Card) -> Result<(), ChoiceProblem> {
  let expected = card
    .correct_answer
    .as_deref()
    .ok_or(ChoiceProblem::MissingAnswer)?;

  if card.options.is_empty() {
    return Ok(());
  }

  let mut normalized: Vec<String> = card.options.iter().map(|o| normalize_option(o)).collect();
  if !normalized.contains(&normalize_option(expected)) {
    return Err(ChoiceProblem::AnswerNotInOptions);
  }

  let count = normalized.len();
  normalized.sort();
  normalized.dedup();
  if normalized.len() != count {
    return Err(ChoiceProblem::DuplicateOptions);
  }

  Ok(())
}
