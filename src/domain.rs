//! Domain models: the curriculum standard, the fixed quality rubric, accepted
//! questions, per-attempt gate diagnostics and answer evaluations.

use serde::Serialize;

use crate::verdict::{AnswerVerdict, QualityVerdict};

/// Fixed five-criterion, 100-point guide used only to gate generated questions.
pub const QUALITY_RUBRIC: &str = "Introduction Clarity (20 Points): The introduction should clearly define the topic and give a brief overview. It should be concise, yet informative enough to provide a basic understanding of the topic.

Context Relevance (20 Points): The context should be directly related to the topic and should provide a deeper understanding of the topic. It should be relevant to the question that follows.

Question Quality (20 Points): The question should be open-ended, allowing for a range of possible answers. It should be based on the information provided in the introduction and context.

Question Relevance (20 Points): The question should be directly related to the topic and should be based on the information provided in the introduction and context.

Independence from External Sources (20 Points): The question should not reference external sources. The answer to the question should be able to be formed based on the information provided in the introduction and context.

Each of the five categories will be scored on a scale of 0-20, with 0 being the lowest and 20 being the highest. The final score will be out of 100.
";

/// Curriculum standard identity. Description and rubric are resolved lazily
/// per session, see `resolver`.
#[derive(Clone, Debug, Serialize)]
pub struct Standard {
  pub code: String,
  pub link: String,
  pub grade: String,
}

/// A question that passed the quality gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
  pub text: String,
  /// 1-based attempt on which the gate accepted it.
  pub attempt: usize,
}

/// Diagnostic record of one gate attempt. Rejected candidate text is not kept.
#[derive(Clone, Debug, Serialize)]
pub struct AttemptReport {
  pub attempt: usize,
  pub verdict: QualityVerdict,
  pub narrative: String,
}

/// Evaluator narrative and the verdict derived from it.
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
  pub narrative: String,
  pub verdict: AnswerVerdict,
}
