//! HTTP endpoint handlers. These are thin wrappers that lock the addressed
//! session and forward to core logic. Each handler is instrumented.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument};

use crate::error::CoachError;
use crate::logic::{reset, run_turn, simulate_answer, submit_answer, submit_topic};
use crate::protocol::*;
use crate::state::AppState;

impl CoachError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      CoachError::UnknownSession(_) => StatusCode::NOT_FOUND,
      CoachError::NoQuestion => StatusCode::CONFLICT,
      CoachError::SimulationDisabled => StatusCode::FORBIDDEN,
      CoachError::GenerativeService(_) => StatusCode::BAD_GATEWAY,
      CoachError::MissingVariable(_) | CoachError::QualityGateExhausted { .. } => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for CoachError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    if status.is_server_error() {
      error!(target: "writing_coach", error = %self, %status, "Request failed");
    }
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(
  State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<TurnReport>), CoachError> {
  let shared = state.create_session().await;
  let mut session = shared.lock().await;
  let report = run_turn(&state.coach, &mut session).await?;
  info!(target: "session", id = %report.session_id, "HTTP session created");
  Ok((StatusCode::CREATED, Json(report)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<TurnReport>, CoachError> {
  let shared = state.get_session(&id).await?;
  let mut session = shared.lock().await;
  Ok(Json(run_turn(&state.coach, &mut session).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, topic_len = body.topic.len()))]
pub async fn http_post_topic(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<TopicIn>,
) -> Result<Json<TurnReport>, CoachError> {
  let shared = state.get_session(&id).await?;
  let mut session = shared.lock().await;
  let report = submit_topic(&state.coach, &mut session, &body.topic).await?;
  info!(target: "session", %id, has_question = report.question.is_some(), "HTTP topic submitted");
  Ok(Json(report))
}

#[instrument(level = "info", skip(state, body), fields(%id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<TurnReport>, CoachError> {
  let shared = state.get_session(&id).await?;
  let mut session = shared.lock().await;
  let report = submit_answer(&state.coach, &mut session, &body.answer).await?;
  info!(target: "session", %id, verdict = ?report.evaluation.as_ref().map(|e| e.verdict), "HTTP answer evaluated");
  Ok(Json(report))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_simulate(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<TurnReport>, CoachError> {
  let shared = state.get_session(&id).await?;
  let mut session = shared.lock().await;
  Ok(Json(simulate_answer(&state.coach, &mut session).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<TurnReport>, CoachError> {
  let shared = state.get_session(&id).await?;
  let mut session = shared.lock().await;
  Ok(Json(reset(&state.coach, &mut session).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, CoachError> {
  state.close_session(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}
