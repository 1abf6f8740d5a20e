//! Study round handlers.
//!
//! The active round lives in the in-memory session store keyed by the
//! `study_session` cookie. Progress is committed to the database on every
//! answer, so losing the session only loses the cursor, and that can be
//! restored from the saved round with `resume`.

use axum::{
  extract::{Path, State},
  Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use super::decks::ensure_unlocked;
use super::{ApiError, ApiResult};
use crate::config;
use crate::db::try_lock;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::domain::Card;
use crate::profile_log;
use crate::session;
use crate::srs::{clamp_round_length, ActiveRound, RoundSummary};
use crate::state::AppState;

/// Session id from the request cookie, if any
pub(crate) fn session_id(jar: &CookieJar) -> Option<String> {
  jar.get(config::SESSION_COOKIE).map(|c| c.value().to_string())
}

fn require_session(jar: &CookieJar) -> ApiResult<String> {
  session_id(jar).ok_or_else(no_active_round)
}

fn no_active_round() -> ApiError {
  ApiError::not_found("No active study round")
}

/// Client view of the round. The correct answer of choice cards is withheld
/// until the card is answered.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
  pub deck_id: String,
  pub mode: &'static str,
  /// Zero-based cursor
  pub position: usize,
  pub total: usize,
  pub score: usize,
  pub over: bool,
  pub card: Option<Card>,
}

impl RoundView {
  fn of(round: &ActiveRound) -> Self {
    let card = round.current_card().map(|card| {
      let mut card = card.clone();
      if !round.is_self_assessed() {
        card.correct_answer = None;
      }
      card
    });
    Self {
      deck_id: round.deck_id().to_string(),
      mode: if round.is_self_assessed() { "flippable" } else { "choice" },
      position: round.current_index(),
      total: round.len(),
      score: round.score(),
      over: round.is_over(),
      card,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
  pub round_length: Option<i64>,
  #[serde(default)]
  pub resume: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
  #[serde(flatten)]
  pub round: RoundView,
  pub resumed: bool,
  /// Set when the deck has nothing left to study
  pub mastered: bool,
}

/// POST /api/decks/{deck_id}/study
///
/// Starts a new round for the deck, or resumes the saved one when asked to.
pub async fn start_round(
  State(state): State<AppState>,
  jar: CookieJar,
  Path(deck_id): Path<String>,
  body: Option<Json<StartRequest>>,
) -> ApiResult<(CookieJar, Json<StartResponse>)> {
  profile_log!(EventType::HandlerStart {
    route: "/api/decks/{deck_id}/study".into(),
    method: "POST".into(),
  });

  let request = body.map(|Json(r)| r).unwrap_or_default();
  let deck = state.deck(&deck_id).ok_or_else(|| ApiError::deck_not_found(&deck_id))?;
  {
    let conn = try_lock(&state.db)?;
    ensure_unlocked(&conn, &deck)?;
  }

  let round_length = request
    .round_length
    .map(clamp_round_length)
    .unwrap_or(state.config.round_length)
    .min(config::MAX_ROUND_LENGTH);

  let resumed = if request.resume {
    ActiveRound::resume(&deck, state.round_ports())?
  } else {
    None
  };
  let is_resumed = resumed.is_some();
  let round = match resumed {
    Some(round) => round,
    None => ActiveRound::start(&deck, round_length, state.round_ports(), &mut rand::rng())?,
  };

  let mastered = round.is_empty() && round.progress().is_mastered(&deck);
  let view = RoundView::of(&round);

  let sid = session_id(&jar).unwrap_or_else(session::generate_session_id);
  session::set_round(&sid, round);

  let cookie = Cookie::build((config::SESSION_COOKIE, sid))
    .path("/")
    .http_only(true)
    .max_age(time::Duration::hours(config::SESSION_EXPIRY_HOURS))
    .build();

  Ok((
    jar.add(cookie),
    Json(StartResponse {
      round: view,
      resumed: is_resumed,
      mastered,
    }),
  ))
}

/// GET /api/study
pub async fn study_state(jar: CookieJar) -> ApiResult<Json<RoundView>> {
  let sid = require_session(&jar)?;
  session::with_round(&sid, |round| RoundView::of(round))
    .map(Json)
    .ok_or_else(no_active_round)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
  pub correct: bool,
  pub correct_answer: Option<String>,
  pub score: usize,
}

/// Apply an assessment to the session's round
fn assess_with(
  jar: &CookieJar,
  f: impl FnOnce(&mut ActiveRound) -> ApiResult<Option<bool>>,
) -> ApiResult<AnswerResponse> {
  let sid = require_session(jar)?;
  session::with_round(&sid, |round| {
    let correct_answer = round.current_card().and_then(|c| c.correct_answer.clone());
    let correct = f(round)?.ok_or_else(|| ApiError::conflict("The round is over"))?;
    Ok(AnswerResponse {
      correct,
      correct_answer,
      score: round.score(),
    })
  })
  .ok_or_else(no_active_round)?
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
  pub selection: String,
}

/// POST /api/study/answer
///
/// Checks a selected option. The cursor does not move.
pub async fn answer(jar: CookieJar, Json(request): Json<AnswerRequest>) -> ApiResult<Json<AnswerResponse>> {
  assess_with(&jar, |round| {
    let round = round
      .as_choice_mut()
      .ok_or_else(|| ApiError::bad_request("This round is self-assessed"))?;
    Ok(round.answer(&request.selection)?)
  })
  .map(Json)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
  pub knew_it: bool,
}

/// POST /api/study/assess
///
/// Records the learner's own verdict on a flippable card.
pub async fn assess(jar: CookieJar, Json(request): Json<AssessRequest>) -> ApiResult<Json<AnswerResponse>> {
  assess_with(&jar, |round| {
    let round = round
      .as_flippable_mut()
      .ok_or_else(|| ApiError::bad_request("This round is answered by choosing an option"))?;
    Ok(round.self_assess(request.knew_it)?)
  })
  .map(Json)
}

/// POST /api/study/ignore
///
/// Excludes the current card from future rounds and moves on.
pub async fn ignore_card(jar: CookieJar) -> ApiResult<Json<RoundView>> {
  let sid = require_session(&jar)?;
  session::with_round(&sid, |round| {
    round
      .ignore_current()?
      .ok_or_else(|| ApiError::conflict("The round is over"))?;
    Ok(RoundView::of(round))
  })
  .ok_or_else(no_active_round)?
  .map(Json)
}

/// POST /api/study/next
pub async fn next_card(jar: CookieJar) -> ApiResult<Json<RoundView>> {
  let sid = require_session(&jar)?;
  session::with_round(&sid, |round| {
    round.advance();
    RoundView::of(round)
  })
  .map(Json)
  .ok_or_else(no_active_round)
}

/// POST /api/study/end
///
/// Ends the session's round, finished or not, and returns the summary.
pub async fn end_round(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Json<RoundSummary>> {
  let sid = require_session(&jar)?;
  let round = session::take_round(&sid).ok_or_else(no_active_round)?;
  let deck = state
    .deck(round.deck_id())
    .ok_or_else(|| ApiError::deck_not_found(round.deck_id()))?;

  let summary = round.finish(&deck);
  tracing::info!(
    "Round for deck {} ended: {}/{}",
    deck.id,
    summary.score,
    summary.total
  );
  Ok(Json(summary))
}
