//! Verdict classification over free-text completions.
//!
//! The generative service only returns narratives; these pure functions are the
//! single place where sentinel phrases are turned into typed verdicts. Matching
//! is a case-insensitive substring test.
//!
//! Known weak point: a narrative that contains both sentinels (for example when
//! it quotes the scoring instructions) is classified by whichever phrase is
//! checked first. "qc succeeded" and "answer is right" win.

use serde::Serialize;

use crate::util::contains_ci;

pub const QC_SUCCEEDED: &str = "qc succeeded";
pub const QC_FAILED: &str = "qc failed";
pub const ANSWER_RIGHT: &str = "answer is right";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
  /// The scorer emitted "qc failed".
  QcFailed,
  /// Neither sentinel was present.
  NoSentinel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum QualityVerdict {
  Accepted,
  Rejected(RejectReason),
}

impl QualityVerdict {
  pub fn is_accepted(&self) -> bool {
    matches!(self, QualityVerdict::Accepted)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerVerdict {
  Right,
  Wrong,
}

pub fn classify_quality(narrative: &str) -> QualityVerdict {
  if contains_ci(narrative, QC_SUCCEEDED) {
    QualityVerdict::Accepted
  } else if contains_ci(narrative, QC_FAILED) {
    QualityVerdict::Rejected(RejectReason::QcFailed)
  } else {
    QualityVerdict::Rejected(RejectReason::NoSentinel)
  }
}

/// Anything without "answer is right" is wrong, including narratives that
/// carry neither sentinel.
pub fn classify_answer(narrative: &str) -> AnswerVerdict {
  if contains_ci(narrative, ANSWER_RIGHT) {
    AnswerVerdict::Right
  } else {
    AnswerVerdict::Wrong
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn low_score_with_failed_sentinel_is_rejected() {
    let v = classify_quality("Introduction: 10\nContext: 10\n... Score: 45 ... qc failed");
    assert_eq!(v, QualityVerdict::Rejected(RejectReason::QcFailed));
  }

  #[test]
  fn high_score_with_succeeded_sentinel_is_accepted() {
    assert_eq!(classify_quality("... Score: 85 ... qc succeeded"), QualityVerdict::Accepted);
    assert_eq!(classify_quality("Total: 90/100. QC Succeeded."), QualityVerdict::Accepted);
  }

  #[test]
  fn missing_sentinel_is_rejected() {
    assert_eq!(
      classify_quality("The question scores 80 out of 100."),
      QualityVerdict::Rejected(RejectReason::NoSentinel)
    );
  }

  #[test]
  fn both_quality_sentinels_resolve_to_accepted() {
    let v = classify_quality("Below 60 would be 'qc failed'. Score 40, so: qc succeeded? no, qc failed");
    assert_eq!(v, QualityVerdict::Accepted);
  }

  #[test]
  fn classification_is_deterministic() {
    let text = "Score: 45 ... qc failed";
    assert_eq!(classify_quality(text), classify_quality(text));
  }

  #[test]
  fn answer_right_and_wrong() {
    assert_eq!(classify_answer("Total 8/10. The Answer Is Right."), AnswerVerdict::Right);
    assert_eq!(classify_answer("Total 2/10. answer is wrong"), AnswerVerdict::Wrong);
  }

  #[test]
  fn answer_without_sentinel_defaults_to_wrong() {
    assert_eq!(classify_answer("Nice effort! Score: 7/10."), AnswerVerdict::Wrong);
    assert_eq!(classify_answer(""), AnswerVerdict::Wrong);
  }

  #[test]
  fn verdicts_serialize_as_snake_case() {
    assert_eq!(serde_json::to_value(AnswerVerdict::Right).unwrap(), "right");
    let v = serde_json::to_value(QualityVerdict::Rejected(RejectReason::QcFailed)).unwrap();
    assert_eq!(v["verdict"], "rejected");
    assert_eq!(v["reason"], "qc_failed");
    assert_eq!(serde_json::to_value(QualityVerdict::Accepted).unwrap()["verdict"], "accepted");
  }
}
