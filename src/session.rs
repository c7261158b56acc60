//! Per-learner session state.
//!
//! The session is the single owner of every artifact one interaction produces.
//! Standard-level artifacts (description, rubric, quality rubric) survive a
//! reset; per-attempt artifacts (topic, question, answer) do not.

use uuid::Uuid;

use crate::domain::{Question, QUALITY_RUBRIC};

#[derive(Clone, Debug)]
pub struct Session {
  pub id: String,
  pub description: Option<String>,
  pub rubric: Option<String>,
  quality_rubric: Option<String>,
  pub topic: String,
  pub question: Option<Question>,
  pub answer: String,
}

impl Session {
  pub fn new() -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      description: None,
      rubric: None,
      quality_rubric: None,
      topic: String::new(),
      question: None,
      answer: String::new(),
    }
  }

  /// The fixed quality rubric, installed on first access and never regenerated.
  pub fn quality_rubric(&mut self) -> &str {
    self.quality_rubric.get_or_insert_with(|| QUALITY_RUBRIC.to_string())
  }

  /// Replace the topic. An already accepted question is kept on purpose:
  /// only `reset` discards it.
  pub fn set_topic(&mut self, topic: &str) {
    self.topic = topic.trim().to_string();
  }

  pub fn set_answer(&mut self, answer: &str) {
    self.answer = answer.to_string();
  }

  pub fn accepted_question(&self) -> Option<&Question> {
    self.question.as_ref()
  }

  /// Clear topic, question and answer.
  pub fn reset(&mut self) {
    self.topic.clear();
    self.question = None;
    self.answer.clear();
  }
}

impl Default for Session {
  fn default() -> Self { Self::new() }
}
