//! Per-card answer reporting.

/// Receives every answer or self-assessment made during a round.
///
/// Reporting is fire-and-forget: implementations handle their own failures
/// and never affect the round.
pub trait CardMetrics: Send + Sync {
  fn record_answer(&self, deck_id: &str, card_id: &str, correct: bool);
}

/// Discards all reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl CardMetrics for NoopMetrics {
  fn record_answer(&self, _deck_id: &str, _card_id: &str, _correct: bool) {}
}
