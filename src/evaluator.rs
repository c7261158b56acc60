//! Answer evaluation and the simulated learner.
//!
//! Evaluation is a one-shot creative call with no retry and no quality gate;
//! the only gate is the instruction in the prompt. The result is never cached.

use tracing::{info, instrument};

use crate::domain::Evaluation;
use crate::error::CoachError;
use crate::openai::Completion;
use crate::util::fill_template;
use crate::verdict::classify_answer;

pub struct AnswerEvaluator<'a> {
  pub llm: &'a dyn Completion,
  pub evaluation_template: &'a str,
  pub student_template: &'a str,
  pub grade: &'a str,
  pub temperature: f32,
}

impl<'a> AnswerEvaluator<'a> {
  #[instrument(level = "info", skip(self, rubric, question, answer), fields(rubric_len = rubric.len(), question_len = question.len(), answer_len = answer.len()))]
  pub async fn evaluate(
    &self,
    rubric: &str,
    question: &str,
    answer: &str,
  ) -> Result<Evaluation, CoachError> {
    let prompt = fill_template(
      self.evaluation_template,
      &[("grade", self.grade), ("rubric", rubric), ("question", question), ("answer", answer)],
    )?;
    let narrative = self.llm.complete(&prompt, self.temperature).await?;
    let verdict = classify_answer(&narrative);
    info!(target: "evaluation", ?verdict, narrative_len = narrative.len(), "Answer evaluated");
    Ok(Evaluation { narrative, verdict })
  }

  /// Answer the question as a student of the configured grade would.
  #[instrument(level = "info", skip(self, question), fields(question_len = question.len()))]
  pub async fn simulate_answer(&self, question: &str) -> Result<String, CoachError> {
    let prompt = fill_template(self.student_template, &[("grade", self.grade), ("question", question)])?;
    let answer = self.llm.complete(&prompt, self.temperature).await?;
    info!(target: "evaluation", answer_len = answer.len(), "Simulated learner answer");
    Ok(answer)
  }
}
