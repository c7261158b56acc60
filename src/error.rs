//! Error taxonomy for the coaching pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
  /// A prompt template was rendered without a binding for one of its placeholders.
  #[error("Missing template variable: {0}")]
  MissingVariable(String),

  /// Every generation attempt failed the quality gate. Recoverable: the
  /// generator turns this into a learner-visible warning.
  #[error("Could not generate high-quality question after {attempts} tries, failed quality check. Please reset and try again.")]
  QualityGateExhausted { attempts: usize },

  /// The generative service failed or timed out. Not retried.
  #[error("Generative service failure: {0}")]
  GenerativeService(String),

  #[error("Unknown session: {0}")]
  UnknownSession(String),

  #[error("No accepted question in this session")]
  NoQuestion,

  #[error("Simulated answers are disabled")]
  SimulationDisabled,
}
