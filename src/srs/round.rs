//! Study round runner.
//!
//! A round walks a fixed list of cards with a cursor. Answering a card updates
//! the deck's progress and commits it through the store, but never moves the
//! cursor; `advance` does. Only the first assessment of a card counts towards
//! the score, later ones still update progress. Once the cursor passes the
//! last card the round is over and every mutating call becomes a no-op.

use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

use super::assessment::{Assessment, ChoiceAssessment, SelfAssessment};
use super::metrics::{CardMetrics, NoopMetrics};
use super::round_selector::select_round;
use super::store::{MemoryStore, ProgressStore, RoundSnapshot, StoreError};
use super::summary::{round_summary, RoundSummary};
use crate::db::LogOnError;
use crate::domain::{Card, CardId, Deck, DeckType, Progress};
use crate::profile_log;

/// Collaborators a round reports to.
#[derive(Clone)]
pub struct RoundPorts {
  pub store: Arc<dyn ProgressStore>,
  pub metrics: Arc<dyn CardMetrics>,
}

impl RoundPorts {
  pub fn new(store: Arc<dyn ProgressStore>, metrics: Arc<dyn CardMetrics>) -> Self {
    Self { store, metrics }
  }

  /// In-memory store without metrics
  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::new()), Arc::new(NoopMetrics))
  }
}

pub struct StudyRound<A: Assessment> {
  deck_id: String,
  cards: Vec<Card>,
  current_index: usize,
  score: usize,
  /// The card at the cursor has already been scored
  current_scored: bool,
  progress: Progress,
  assessment: A,
  ports: RoundPorts,
}

pub type ChoiceRound = StudyRound<ChoiceAssessment>;
pub type FlippableRound = StudyRound<SelfAssessment>;

impl<A: Assessment> StudyRound<A> {
  /// Round over an explicit card list, starting at the first card.
  pub fn new(deck_id: &str, cards: Vec<Card>, progress: Progress, assessment: A, ports: RoundPorts) -> Self {
    Self {
      deck_id: deck_id.to_string(),
      cards,
      current_index: 0,
      score: 0,
      current_scored: false,
      progress,
      assessment,
      ports,
    }
  }

  /// Load the deck's progress and select a fresh round.
  ///
  /// The new round replaces any round saved for the deck.
  pub fn start<R: Rng + ?Sized>(
    deck: &Deck,
    round_length: usize,
    assessment: A,
    ports: RoundPorts,
    rng: &mut R,
  ) -> Result<Self, StoreError> {
    let progress = ports.store.load_progress(&deck.id)?;
    let cards = select_round(&deck.cards, &progress, round_length, rng);

    let review_count = cards.iter().filter(|c| progress.is_in_review(&c.card_id)).count();
    info!(
      "Starting {} round for deck {}: {} cards ({} review, {} new)",
      deck.deck_type.as_str(),
      deck.id,
      cards.len(),
      review_count,
      cards.len() - review_count
    );
    profile_log!(crate::profiling::EventType::RoundSelected {
      deck_id: deck.id.clone(),
      requested: round_length,
      selected: cards.len(),
      review: review_count,
    });

    let round = Self::new(&deck.id, cards, progress, assessment, ports);
    round.save_snapshot();
    Ok(round)
  }

  /// Rebuild the round saved for `deck`.
  ///
  /// Cards removed from the deck since the snapshot are dropped, as are
  /// upcoming cards that have been ignored. Returns `None` when nothing is
  /// saved or nothing is left to study.
  pub fn resume(deck: &Deck, assessment: A, ports: RoundPorts) -> Result<Option<Self>, StoreError> {
    let Some(snapshot) = ports.store.load_round(&deck.id)? else {
      return Ok(None);
    };
    let progress = ports.store.load_progress(&deck.id)?;

    let mut cards = Vec::with_capacity(snapshot.card_ids.len());
    let mut current_index = 0;
    for (i, card_id) in snapshot.card_ids.iter().enumerate() {
      let Some(card) = deck.card(card_id) else {
        continue;
      };
      if i < snapshot.current_index {
        current_index += 1;
      } else if progress.is_ignored(card_id) {
        continue;
      }
      cards.push(card.clone());
    }

    if current_index >= cards.len() {
      debug!("Saved round for deck {} has nothing left to study", deck.id);
      ports
        .store
        .clear_round(&deck.id)
        .log_warn("Failed to clear finished round");
      return Ok(None);
    }

    // The cursor may have moved back if earlier cards left the deck
    let current_scored = snapshot.current_scored && current_index == snapshot.current_index;
    let score = snapshot.score.min(current_index + usize::from(current_scored));

    info!(
      "Resuming round for deck {} at card {} of {}",
      deck.id,
      current_index + 1,
      cards.len()
    );
    Ok(Some(Self {
      deck_id: deck.id.clone(),
      cards,
      current_index,
      score,
      current_scored,
      progress,
      assessment,
      ports,
    }))
  }

  pub fn deck_id(&self) -> &str {
    &self.deck_id
  }

  pub fn cards(&self) -> &[Card] {
    &self.cards
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn score(&self) -> usize {
    self.score
  }

  pub fn progress(&self) -> &Progress {
    &self.progress
  }

  pub fn into_progress(self) -> Progress {
    self.progress
  }

  pub fn is_self_assessed(&self) -> bool {
    self.assessment.is_self_assessed()
  }

  pub fn is_over(&self) -> bool {
    self.current_index >= self.cards.len()
  }

  pub fn current_card(&self) -> Option<&Card> {
    self.cards.get(self.current_index)
  }

  /// Assess the current card and commit the outcome.
  ///
  /// Returns `Ok(None)` when the round is over. The cursor stays on the card.
  /// Repeated assessments of the same card update progress but not the score.
  pub fn assess(&mut self, input: &A::Input) -> Result<Option<bool>, StoreError> {
    let Some(card) = self.current_card() else {
      return Ok(None);
    };
    let card_id = card.card_id.clone();
    let correct = self.assessment.assess(card, input);

    self.progress.record(&card_id, correct);
    if correct && !self.current_scored {
      self.score += 1;
    }
    self.current_scored = true;
    debug!("Deck {} card {}: correct={}", self.deck_id, card_id, correct);
    profile_log!(crate::profiling::EventType::CardAssessed {
      deck_id: self.deck_id.clone(),
      card_id: card_id.clone(),
      correct,
    });
    self.ports.metrics.record_answer(&self.deck_id, &card_id, correct);

    self.ports.store.save_progress(&self.deck_id, &self.progress)?;
    self.save_snapshot();
    Ok(Some(correct))
  }

  /// Move to the next card. Returns true once the round is over.
  pub fn advance(&mut self) -> bool {
    if !self.is_over() {
      self.current_index += 1;
      self.current_scored = false;
      if self.is_over() {
        self
          .ports
          .store
          .clear_round(&self.deck_id)
          .log_warn("Failed to clear finished round");
      } else {
        self.save_snapshot();
      }
    }
    self.is_over()
  }

  /// Exclude the current card from future rounds and move past it without
  /// scoring. Returns the ignored card id, or `None` when the round is over.
  pub fn ignore_current(&mut self) -> Result<Option<CardId>, StoreError> {
    let Some(card) = self.current_card() else {
      return Ok(None);
    };
    let card_id = card.card_id.clone();

    self.progress.ignore(&card_id);
    info!("Deck {}: ignoring card {}", self.deck_id, card_id);
    profile_log!(crate::profiling::EventType::CardIgnored {
      deck_id: self.deck_id.clone(),
      card_id: card_id.clone(),
    });
    self.ports.store.save_progress(&self.deck_id, &self.progress)?;

    self.advance();
    Ok(Some(card_id))
  }

  pub fn snapshot(&self) -> RoundSnapshot {
    RoundSnapshot {
      deck_id: self.deck_id.clone(),
      card_ids: self.cards.iter().map(|c| c.card_id.clone()).collect(),
      current_index: self.current_index,
      score: self.score,
      current_scored: self.current_scored,
    }
  }

  fn save_snapshot(&self) {
    self
      .ports
      .store
      .save_round(&self.snapshot())
      .log_warn("Failed to save round");
  }

  /// End the round (finished or abandoned) and summarize it.
  pub fn finish(self, deck: &Deck) -> RoundSummary {
    self
      .ports
      .store
      .clear_round(&self.deck_id)
      .log_warn("Failed to clear round");

    let mastered = self.progress.is_mastered(deck);
    if mastered {
      info!("Deck {} is fully mastered", self.deck_id);
    }
    round_summary(self.score, self.cards.len(), self.is_self_assessed(), mastered)
  }
}

impl ChoiceRound {
  /// Check `selection` against the current card's answer.
  pub fn answer(&mut self, selection: &str) -> Result<Option<bool>, StoreError> {
    self.assess(selection)
  }
}

impl FlippableRound {
  /// Record the learner's own verdict on the current card.
  pub fn self_assess(&mut self, knew_it: bool) -> Result<Option<bool>, StoreError> {
    self.assess(&knew_it)
  }
}

/// A round of either flavor, chosen by the deck type.
pub enum ActiveRound {
  Choice(ChoiceRound),
  Flippable(FlippableRound),
}

macro_rules! with_round {
  ($self:expr, $round:ident => $body:expr) => {
    match $self {
      ActiveRound::Choice($round) => $body,
      ActiveRound::Flippable($round) => $body,
    }
  };
}

impl ActiveRound {
  pub fn start<R: Rng + ?Sized>(
    deck: &Deck,
    round_length: usize,
    ports: RoundPorts,
    rng: &mut R,
  ) -> Result<Self, StoreError> {
    Ok(match deck.deck_type {
      DeckType::Flippable => Self::Flippable(StudyRound::start(deck, round_length, SelfAssessment, ports, rng)?),
      DeckType::MultipleChoice | DeckType::AudioChoice => {
        Self::Choice(StudyRound::start(deck, round_length, ChoiceAssessment, ports, rng)?)
      }
    })
  }

  pub fn resume(deck: &Deck, ports: RoundPorts) -> Result<Option<Self>, StoreError> {
    Ok(match deck.deck_type {
      DeckType::Flippable => StudyRound::resume(deck, SelfAssessment, ports)?.map(Self::Flippable),
      DeckType::MultipleChoice | DeckType::AudioChoice => {
        StudyRound::resume(deck, ChoiceAssessment, ports)?.map(Self::Choice)
      }
    })
  }

  pub fn as_choice_mut(&mut self) -> Option<&mut ChoiceRound> {
    match self {
      Self::Choice(round) => Some(round),
      Self::Flippable(_) => None,
    }
  }

  pub fn as_flippable_mut(&mut self) -> Option<&mut FlippableRound> {
    match self {
      Self::Flippable(round) => Some(round),
      Self::Choice(_) => None,
    }
  }

  pub fn deck_id(&self) -> &str {
    with_round!(self, r => r.deck_id())
  }

  pub fn len(&self) -> usize {
    with_round!(self, r => r.len())
  }

  pub fn is_empty(&self) -> bool {
    with_round!(self, r => r.is_empty())
  }

  pub fn current_index(&self) -> usize {
    with_round!(self, r => r.current_index())
  }

  pub fn score(&self) -> usize {
    with_round!(self, r => r.score())
  }

  pub fn progress(&self) -> &Progress {
    with_round!(self, r => r.progress())
  }

  pub fn is_self_assessed(&self) -> bool {
    matches!(self, Self::Flippable(_))
  }

  pub fn is_over(&self) -> bool {
    with_round!(self, r => r.is_over())
  }

  pub fn current_card(&self) -> Option<&Card> {
    with_round!(self, r => r.current_card())
  }

  pub fn advance(&mut self) -> bool {
    with_round!(self, r => r.advance())
  }

  pub fn ignore_current(&mut self) -> Result<Option<CardId>, StoreError> {
    with_round!(self, r => r.ignore_current())
  }

  pub fn snapshot(&self) -> RoundSnapshot {
    with_round!(self, r => r.snapshot())
  }

  pub fn finish(self, deck: &Deck) -> RoundSummary {
    with_round!(self, r => r.finish(deck))
  }
}
