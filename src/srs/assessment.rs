//! How a round decides whether the learner knew a card.

use crate::domain::Card;
use crate::validation::check_choice;

/// Strategy that turns the learner's input for a card into a correct/incorrect
/// outcome.
pub trait Assessment {
  type Input: ?Sized;

  fn assess(&self, card: &Card, input: &Self::Input) -> bool;

  /// True when the learner grades themselves rather than being checked
  fn is_self_assessed(&self) -> bool {
    false
  }
}

/// Multiple choice and audio choice decks: the selected option is compared
/// with the card's canonical answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChoiceAssessment;

impl Assessment for ChoiceAssessment {
  type Input = str;

  fn assess(&self, card: &Card, selection: &str) -> bool {
    check_choice(card, selection)
  }
}

/// Flippable decks: the learner declares whether they knew the card.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfAssessment;

impl Assessment for SelfAssessment {
  type Input = bool;

  fn assess(&self, _card: &Card, knew_it: &bool) -> bool {
    *knew_it
  }

  fn is_self_assessed(&self) -> bool {
    true
  }
}
