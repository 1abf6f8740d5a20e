//! End-of-round feedback.

use serde::Serialize;

/// Outcome of a finished round as shown to the learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
  pub score: usize,
  pub total: usize,
  pub percentage: u8,
  pub title: String,
  pub message: String,
  /// Every non-ignored card of the deck is learned
  pub deck_mastered: bool,
}

/// Title and encouragement for a score, by percentage tier.
///
/// Tiers compare `score * 100` against `tier * total` so boundaries like 7/10
/// land exactly on 70%.
fn tier(score: usize, total: usize) -> (&'static str, String) {
  let at_least = |percent: usize| total > 0 && score * 100 >= percent * total;

  if at_least(100) {
    let message = if total < 10 {
      format!("You nailed all {} questions! Perfect round!", total)
    } else {
      "Incredible! Flawless victory! You are an expert!".to_string()
    };
    return ("PERFECT SCORE!", message);
  }

  let (title, message) = if at_least(90) {
    ("Outstanding!", "Nearly perfect! You have truly mastered this subject.")
  } else if at_least(80) {
    ("Excellent!", "Your knowledge is shining through. Fantastic result!")
  } else if at_least(70) {
    ("Great Work!", "A solid grasp of the material. That's impressive!")
  } else if at_least(60) {
    ("Well Done!", "Over half correct! You are demonstrating a good understanding.")
  } else if at_least(50) {
    ("Halfway!", "You hit the 50% mark! Keep up the great momentum!")
  } else if at_least(40) {
    ("Getting There!", "Solid work! Consistency is your greatest ally.")
  } else if at_least(20) {
    ("Building Blocks!", "You are laying the foundation for success.")
  } else if score > 0 {
    ("First Step!", "You got one! The journey of a thousand miles begins with a single step.")
  } else {
    ("Keep Trying!", "Every master was once a beginner. Don't give up!")
  };
  (title, message.to_string())
}

/// Build the summary for a round with `score` correct out of `total` cards.
pub fn round_summary(score: usize, total: usize, self_assessed: bool, deck_mastered: bool) -> RoundSummary {
  let score = score.min(total);
  let (title, encouragement) = tier(score, total);
  let percentage = if total > 0 {
    (score * 100 / total) as u8
  } else {
    0
  };
  let headline = if self_assessed {
    format!("You marked {} of {} cards as known.", score, total)
  } else {
    format!("You got {} out of {} correct.", score, total)
  };

  RoundSummary {
    score,
    total,
    percentage,
    title: title.to_string(),
    message: format!("{}\n{}", headline, encouragement),
    deck_mastered,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_perfect_short_round() {
    let s = round_summary(7, 7, false, false);
    assert_eq!(s.title, "PERFECT SCORE!");
    assert_eq!(s.percentage, 100);
    assert!(s.message.starts_with("You got 7 out of 7 correct.\n"));
    assert!(s.message.contains("You nailed all 7 questions!"));
  }

  #[test]
  fn test_perfect_long_round() {
    let s = round_summary(12, 12, false, true);
    assert!(s.message.contains("Flawless victory"));
    assert!(s.deck_mastered);
  }

  #[test]
  fn test_tiers() {
    let cases = [
      (9, 10, "Outstanding!"),
      (6, 7, "Excellent!"),
      (7, 10, "Great Work!"),
      (6, 10, "Well Done!"),
      (5, 10, "Halfway!"),
      (4, 10, "Getting There!"),
      (2, 10, "Building Blocks!"),
      (1, 10, "First Step!"),
      (0, 10, "Keep Trying!"),
    ];
    for (score, total, title) in cases {
      assert_eq!(round_summary(score, total, false, false).title, title, "{}/{}", score, total);
    }
  }

  #[test]
  fn test_self_assessed_message() {
    let s = round_summary(3, 5, true, false);
    assert!(s.message.starts_with("You marked 3 of 5 cards as known.\n"));
  }

  #[test]
  fn test_empty_round() {
    let s = round_summary(0, 0, false, true);
    assert_eq!(s.percentage, 0);
    assert_eq!(s.title, "Keep Trying!");
  }

  #[test]
  fn test_score_above_total_is_capped() {
    let s = round_summary(9, 7, false, false);
    assert_eq!(s.score, 7);
    assert_eq!(s.percentage, 100);
    assert_eq!(s.title, "PERFECT SCORE!");
    assert!(s.message.starts_with("You got 7 out of 7 correct.\n"));
  }
}
