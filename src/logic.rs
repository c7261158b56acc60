//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Every learner input mutates the session and then runs one turn, the same
//! way a page re-renders after each input:
//!   1. resolve the standard's description and rubric (memoized)
//!   2. install the quality rubric (constant)
//!   3. with a topic: make sure a gated question exists
//!   4. with a question and an answer: evaluate the answer (never cached)
//!
//! Calls inside a turn are awaited one after another.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{AgentConfig, Diagnostics, Prompts, Sampling};
use crate::domain::Standard;
use crate::error::CoachError;
use crate::evaluator::AnswerEvaluator;
use crate::generator::{GenerationReport, QuestionGenerator};
use crate::openai::Completion;
use crate::protocol::TurnReport;
use crate::resolver::StandardResolver;
use crate::session::Session;

/// Process-wide pipeline dependencies. Holds no per-learner state.
pub struct Coach {
  pub llm: Arc<dyn Completion>,
  pub standard: Standard,
  pub max_attempts: usize,
  pub sampling: Sampling,
  pub diagnostics: Diagnostics,
  pub prompts: Prompts,
}

impl Coach {
  pub fn new(llm: Arc<dyn Completion>, cfg: AgentConfig) -> Self {
    let max_attempts = if cfg.gate.max_attempts == 0 {
      warn!(target: "writing_coach", "gate.max_attempts = 0 is not usable; using 1");
      1
    } else {
      cfg.gate.max_attempts
    };
    Self {
      llm,
      standard: Standard {
        code: cfg.standard.code,
        link: cfg.standard.link,
        grade: cfg.standard.grade,
      },
      max_attempts,
      sampling: cfg.sampling,
      diagnostics: cfg.diagnostics,
      prompts: cfg.prompts,
    }
  }

  fn resolver(&self) -> StandardResolver<'_> {
    StandardResolver {
      llm: self.llm.as_ref(),
      description_template: &self.prompts.description_template,
      rubric_template: &self.prompts.rubric_template,
      temperature: self.sampling.deterministic,
    }
  }

  fn generator(&self) -> QuestionGenerator<'_> {
    QuestionGenerator {
      llm: self.llm.as_ref(),
      question_template: &self.prompts.question_template,
      quality_template: &self.prompts.quality_template,
      standard_code: &self.standard.code,
      grade: &self.standard.grade,
      max_attempts: self.max_attempts,
      creative_temperature: self.sampling.creative,
      deterministic_temperature: self.sampling.deterministic,
    }
  }

  fn evaluator(&self) -> AnswerEvaluator<'_> {
    AnswerEvaluator {
      llm: self.llm.as_ref(),
      evaluation_template: &self.prompts.evaluation_template,
      student_template: &self.prompts.student_template,
      grade: &self.standard.grade,
      temperature: self.sampling.creative,
    }
  }
}

#[instrument(level = "info", skip(coach, session), fields(session_id = %session.id))]
pub async fn run_turn(coach: &Coach, session: &mut Session) -> Result<TurnReport, CoachError> {
  let resolver = coach.resolver();
  let description = resolver.resolve_description(session, &coach.standard.code).await?;
  let rubric = resolver.resolve_rubric(session, &coach.standard.code).await?;
  let quality_rubric = session.quality_rubric().to_string();

  let mut generation = GenerationReport::default();
  let mut evaluation = None;

  if !session.topic.is_empty() {
    generation = coach.generator().ensure_question(session).await?;

    if let Some(question) = session.accepted_question().cloned() {
      if !session.answer.is_empty() {
        evaluation = Some(coach.evaluator().evaluate(&rubric, &question.text, &session.answer).await?);
      }
    }
  }

  info!(
    target: "writing_coach",
    has_question = session.question.is_some(),
    attempts = generation.attempts.len(),
    evaluated = evaluation.is_some(),
    "Turn complete"
  );

  Ok(TurnReport {
    session_id: session.id.clone(),
    standard: coach.standard.clone(),
    description,
    rubric,
    quality_rubric,
    topic: session.topic.clone(),
    question: session.question.as_ref().map(|q| q.text.clone()),
    attempts: generation.attempts,
    warning: generation.warning,
    answer: session.answer.clone(),
    evaluation,
  })
}

#[instrument(level = "info", skip(coach, session, topic), fields(session_id = %session.id, topic_len = topic.len()))]
pub async fn submit_topic(coach: &Coach, session: &mut Session, topic: &str) -> Result<TurnReport, CoachError> {
  session.set_topic(topic);
  run_turn(coach, session).await
}

#[instrument(level = "info", skip(coach, session, answer), fields(session_id = %session.id, answer_len = answer.len()))]
pub async fn submit_answer(coach: &Coach, session: &mut Session, answer: &str) -> Result<TurnReport, CoachError> {
  session.set_answer(answer);
  run_turn(coach, session).await
}

/// Fill the answer with a simulated learner's response, then evaluate it.
#[instrument(level = "info", skip(coach, session), fields(session_id = %session.id))]
pub async fn simulate_answer(coach: &Coach, session: &mut Session) -> Result<TurnReport, CoachError> {
  if !coach.diagnostics.simulate_answers {
    return Err(CoachError::SimulationDisabled);
  }
  let question = session.accepted_question().cloned().ok_or(CoachError::NoQuestion)?;
  let answer = coach.evaluator().simulate_answer(&question.text).await?;
  session.set_answer(&answer);
  run_turn(coach, session).await
}

#[instrument(level = "info", skip(coach, session), fields(session_id = %session.id))]
pub async fn reset(coach: &Coach, session: &mut Session) -> Result<TurnReport, CoachError> {
  session.reset();
  run_turn(coach, session).await
}
