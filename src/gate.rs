//! Bounded-retry quality gate.
//!
//! The loop is independent of any generative service: it drives an injected
//! `GateSteps` capability (author a candidate, score a candidate) and applies
//! the accept / retry / exhausted transitions.
//!
//! ```text
//! NeedsQuestion -> Generating -> Scoring -> { Accepted, Retry, Exhausted }
//!                      ^                        |
//!                      +------------------------+
//! ```
//!
//! Attempts are strictly sequential and the loop stops at the first accepted
//! candidate.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::{AttemptReport, Question};
use crate::error::CoachError;
use crate::util::trunc_for_log;
use crate::verdict::classify_quality;

#[async_trait]
pub trait GateSteps: Send {
  /// Author one candidate question.
  async fn generate(&mut self, attempt: usize) -> Result<String, CoachError>;
  /// Score a candidate; returns the scorer's free-form narrative.
  async fn score(&mut self, attempt: usize, candidate: &str) -> Result<String, CoachError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
  NeedsQuestion,
  Generating,
  Scoring,
  Accepted,
  Retry,
  Exhausted,
}

#[derive(Debug)]
pub enum GateOutcome {
  Accepted { question: Question, attempts: Vec<AttemptReport> },
  Exhausted { attempts: Vec<AttemptReport> },
}

impl GateOutcome {
  pub fn attempts(&self) -> &[AttemptReport] {
    match self {
      GateOutcome::Accepted { attempts, .. } | GateOutcome::Exhausted { attempts } => attempts,
    }
  }
}

pub struct QualityGate {
  max_attempts: usize,
  state: GateState,
}

impl QualityGate {
  pub fn new(max_attempts: usize) -> Self {
    Self { max_attempts, state: GateState::NeedsQuestion }
  }

  pub fn state(&self) -> GateState {
    self.state
  }

  fn transition(&mut self, to: GateState, attempt: usize) {
    debug!(target: "gate", from = ?self.state, ?to, attempt, "Gate transition");
    self.state = to;
  }

  /// Run one generation episode. Step failures propagate immediately and leave
  /// the gate in the state it was in when the step failed.
  #[instrument(level = "info", skip(self, steps), fields(max_attempts = self.max_attempts))]
  pub async fn run<S>(&mut self, steps: &mut S) -> Result<GateOutcome, CoachError>
  where
    S: GateSteps + ?Sized,
  {
    let mut reports = Vec::with_capacity(self.max_attempts);

    for attempt in 1..=self.max_attempts {
      self.transition(GateState::Generating, attempt);
      let candidate = steps.generate(attempt).await?;

      self.transition(GateState::Scoring, attempt);
      let narrative = steps.score(attempt, &candidate).await?;
      let verdict = classify_quality(&narrative);
      reports.push(AttemptReport { attempt, verdict, narrative });

      if verdict.is_accepted() {
        self.transition(GateState::Accepted, attempt);
        info!(target: "gate", attempt, "Candidate accepted");
        return Ok(GateOutcome::Accepted {
          question: Question { text: candidate, attempt },
          attempts: reports,
        });
      }

      self.transition(GateState::Retry, attempt);
      debug!(target: "gate", attempt, ?verdict, candidate = %trunc_for_log(&candidate, 120), "Candidate rejected");
    }

    self.transition(GateState::Exhausted, self.max_attempts);
    warn!(target: "gate", attempts = self.max_attempts, "Quality gate exhausted");
    Ok(GateOutcome::Exhausted { attempts: reports })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::VecDeque;

  use super::*;
  use crate::verdict::{QualityVerdict, RejectReason};

  /// Candidates are "candidate N"; scores are replayed from the script.
  struct ScriptedSteps {
    scores: VecDeque<&'static str>,
    generated: usize,
    scored: Vec<String>,
  }

  impl ScriptedSteps {
    fn new(scores: &[&'static str]) -> Self {
      Self { scores: scores.iter().copied().collect(), generated: 0, scored: Vec::new() }
    }
  }

  #[async_trait]
  impl GateSteps for ScriptedSteps {
    async fn generate(&mut self, attempt: usize) -> Result<String, CoachError> {
      self.generated += 1;
      Ok(format!("candidate {attempt}"))
    }

    async fn score(&mut self, _attempt: usize, candidate: &str) -> Result<String, CoachError> {
      self.scored.push(candidate.to_string());
      self.scores
        .pop_front()
        .map(str::to_string)
        .ok_or_else(|| CoachError::GenerativeService("no more scores".into()))
    }
  }

  #[tokio::test]
  async fn first_acceptance_short_circuits() {
    let mut steps = ScriptedSteps::new(&["Score: 85 qc succeeded", "unused", "unused"]);
    let mut gate = QualityGate::new(3);

    let outcome = gate.run(&mut steps).await.unwrap();

    assert_eq!(gate.state(), GateState::Accepted);
    assert_eq!(steps.generated, 1);
    assert_eq!(steps.scored, vec!["candidate 1"]);
    match outcome {
      GateOutcome::Accepted { question, attempts } => {
        assert_eq!(question.text, "candidate 1");
        assert_eq!(question.attempt, 1);
        assert_eq!(attempts.len(), 1);
      }
      other => panic!("expected acceptance, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn accepts_on_later_attempt_and_stops() {
    let mut steps = ScriptedSteps::new(&["Score: 45 qc failed", "Score: 70 qc succeeded", "unused"]);
    let mut gate = QualityGate::new(3);

    let outcome = gate.run(&mut steps).await.unwrap();

    assert_eq!(steps.generated, 2);
    assert_eq!(steps.scores.len(), 1);
    match outcome {
      GateOutcome::Accepted { question, attempts } => {
        assert_eq!(question.text, "candidate 2");
        assert_eq!(question.attempt, 2);
        assert_eq!(attempts[0].verdict, QualityVerdict::Rejected(RejectReason::QcFailed));
        assert_eq!(attempts[1].verdict, QualityVerdict::Accepted);
      }
      other => panic!("expected acceptance, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn never_scores_more_than_bound() {
    let mut steps = ScriptedSteps::new(&["qc failed", "no verdict at all", "qc failed", "qc succeeded"]);
    let mut gate = QualityGate::new(3);

    let outcome = gate.run(&mut steps).await.unwrap();

    assert_eq!(gate.state(), GateState::Exhausted);
    assert_eq!(steps.generated, 3);
    assert_eq!(steps.scored.len(), 3);
    assert_eq!(outcome.attempts().len(), 3);
    assert_eq!(
      outcome.attempts()[1].verdict,
      QualityVerdict::Rejected(RejectReason::NoSentinel)
    );
    assert!(matches!(outcome, GateOutcome::Exhausted { .. }));
  }

  #[tokio::test]
  async fn step_failure_propagates() {
    let mut steps = ScriptedSteps::new(&["qc failed"]);
    let mut gate = QualityGate::new(3);

    let err = gate.run(&mut steps).await.unwrap_err();

    assert!(matches!(err, CoachError::GenerativeService(_)));
    assert_eq!(gate.state(), GateState::Scoring);
    assert_eq!(steps.generated, 2);
  }

  #[test]
  fn new_gate_needs_question() {
    assert_eq!(QualityGate::new(3).state(), GateState::NeedsQuestion);
  }
}
