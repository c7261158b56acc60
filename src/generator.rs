//! Quality-gated question generation for a session.
//!
//! Wires the gate to the question-authoring and quality-scoring prompts. An
//! accepted question is memoized in the session and never regenerated; an
//! exhausted gate clears the session's question and yields a warning.

use tracing::{debug, info, instrument, warn};

use async_trait::async_trait;

use crate::domain::AttemptReport;
use crate::error::CoachError;
use crate::gate::{GateOutcome, GateSteps, QualityGate};
use crate::openai::Completion;
use crate::session::Session;
use crate::util::fill_template;

pub struct QuestionGenerator<'a> {
  pub llm: &'a dyn Completion,
  pub question_template: &'a str,
  pub quality_template: &'a str,
  pub standard_code: &'a str,
  pub grade: &'a str,
  pub max_attempts: usize,
  pub creative_temperature: f32,
  pub deterministic_temperature: f32,
}

/// What one `ensure_question` call did.
#[derive(Debug, Default)]
pub struct GenerationReport {
  /// Per-attempt diagnostics; empty when the question was already memoized.
  pub attempts: Vec<AttemptReport>,
  /// Set when the gate was exhausted.
  pub warning: Option<String>,
}

struct PromptSteps<'g, 'a> {
  gen: &'g QuestionGenerator<'a>,
  topic: &'g str,
  qc_rubric: &'g str,
}

#[async_trait]
impl<'g, 'a> GateSteps for PromptSteps<'g, 'a> {
  #[instrument(level = "info", skip(self), fields(topic_len = self.topic.len()))]
  async fn generate(&mut self, attempt: usize) -> Result<String, CoachError> {
    let prompt = fill_template(
      self.gen.question_template,
      &[("ccss", self.gen.standard_code), ("topic", self.topic), ("grade", self.gen.grade)],
    )?;
    self.gen.llm.complete(&prompt, self.gen.creative_temperature).await
  }

  #[instrument(level = "info", skip(self, candidate), fields(candidate_len = candidate.len()))]
  async fn score(&mut self, attempt: usize, candidate: &str) -> Result<String, CoachError> {
    let prompt = fill_template(
      self.gen.quality_template,
      &[("qc_rubric", self.qc_rubric), ("question", candidate)],
    )?;
    self.gen.llm.complete(&prompt, self.gen.deterministic_temperature).await
  }
}

impl<'a> QuestionGenerator<'a> {
  /// Make sure the session holds an accepted question for its topic.
  /// Does nothing when a question was accepted earlier or the topic is empty.
  #[instrument(level = "info", skip(self, session), fields(session_id = %session.id, topic = %session.topic))]
  pub async fn ensure_question(&self, session: &mut Session) -> Result<GenerationReport, CoachError> {
    if session.question.is_some() || session.topic.is_empty() {
      return Ok(GenerationReport::default());
    }

    let qc_rubric = session.quality_rubric().to_string();
    let topic = session.topic.clone();
    let mut steps = PromptSteps { gen: self, topic: &topic, qc_rubric: &qc_rubric };
    let mut gate = QualityGate::new(self.max_attempts);

    let outcome = gate.run(&mut steps).await?;
    debug!(target: "gate", state = ?gate.state(), attempts = outcome.attempts().len(), "Gate finished");

    match outcome {
      GateOutcome::Accepted { question, attempts } => {
        info!(target: "gate", attempt = question.attempt, question_len = question.text.len(), "Question stored in session");
        session.question = Some(question);
        Ok(GenerationReport { attempts, warning: None })
      }
      GateOutcome::Exhausted { attempts } => {
        session.question = None;
        let exhausted = CoachError::QualityGateExhausted { attempts: self.max_attempts };
        warn!(target: "gate", error = %exhausted, "No question passed the quality gate");
        Ok(GenerationReport { attempts, warning: Some(exhausted.to_string()) })
      }
    }
  }
}
