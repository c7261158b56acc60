//! Lazily resolves the standard's description and scoring rubric, memoized in
//! the session: at most one deterministic generative call per artifact.

use tracing::{info, instrument};

use crate::error::CoachError;
use crate::openai::Completion;
use crate::session::Session;
use crate::util::fill_template;

pub struct StandardResolver<'a> {
  pub llm: &'a dyn Completion,
  pub description_template: &'a str,
  pub rubric_template: &'a str,
  pub temperature: f32,
}

impl<'a> StandardResolver<'a> {
  #[instrument(level = "info", skip(self, session), fields(session_id = %session.id))]
  pub async fn resolve_description(
    &self,
    session: &mut Session,
    standard_code: &str,
  ) -> Result<String, CoachError> {
    if let Some(desc) = &session.description {
      return Ok(desc.clone());
    }
    let prompt = fill_template(self.description_template, &[("ccss", standard_code)])?;
    let desc = self.llm.complete(&prompt, self.temperature).await?;
    info!(target: "standard", %standard_code, desc_len = desc.len(), "Resolved standard description");
    session.description = Some(desc.clone());
    Ok(desc)
  }

  #[instrument(level = "info", skip(self, session), fields(session_id = %session.id))]
  pub async fn resolve_rubric(
    &self,
    session: &mut Session,
    standard_code: &str,
  ) -> Result<String, CoachError> {
    if let Some(rubric) = &session.rubric {
      return Ok(rubric.clone());
    }
    let prompt = fill_template(self.rubric_template, &[("ccss", standard_code)])?;
    let rubric = self.llm.complete(&prompt, self.temperature).await?;
    info!(target: "standard", %standard_code, rubric_len = rubric.len(), "Resolved scoring rubric");
    session.rubric = Some(rubric.clone());
    Ok(rubric)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::openai::testing::ScriptedCompletion;

  const CODE: &str = "CCSS.ELA-LITERACY.W.4.9";

  fn resolver<'a>(llm: &'a ScriptedCompletion, prompts: &'a Prompts) -> StandardResolver<'a> {
    StandardResolver {
      llm,
      description_template: &prompts.description_template,
      rubric_template: &prompts.rubric_template,
      temperature: 0.0,
    }
  }

  #[tokio::test]
  async fn description_is_resolved_once_per_session() {
    let llm = ScriptedCompletion::new(["Students draw evidence from texts."]);
    let prompts = Prompts::default();
    let r = resolver(&llm, &prompts);
    let mut session = Session::new();

    let first = r.resolve_description(&mut session, CODE).await.unwrap();
    let second = r.resolve_description(&mut session, CODE).await.unwrap();
    let third = r.resolve_description(&mut session, CODE).await.unwrap();

    assert_eq!(first, "Students draw evidence from texts.");
    assert_eq!(second, first);
    assert_eq!(third, first);
    assert_eq!(llm.call_count(), 1);
    let call = &llm.calls()[0];
    assert_eq!(call.prompt, format!("Provide a description of Common Core standard {CODE}"));
    assert_eq!(call.temperature, 0.0);
  }

  #[tokio::test]
  async fn rubric_is_resolved_once_per_session() {
    let llm = ScriptedCompletion::new(["4 pts: strong evidence"]);
    let prompts = Prompts::default();
    let r = resolver(&llm, &prompts);
    let mut session = Session::new();

    r.resolve_rubric(&mut session, CODE).await.unwrap();
    r.resolve_rubric(&mut session, CODE).await.unwrap();

    assert_eq!(llm.call_count(), 1);
    assert_eq!(session.rubric.as_deref(), Some("4 pts: strong evidence"));
    assert!(llm.calls()[0].prompt.contains("point-based system"));
  }

  #[tokio::test]
  async fn memoized_artifacts_survive_reset() {
    let llm = ScriptedCompletion::new(["desc", "rubric"]);
    let prompts = Prompts::default();
    let r = resolver(&llm, &prompts);
    let mut session = Session::new();

    r.resolve_description(&mut session, CODE).await.unwrap();
    r.resolve_rubric(&mut session, CODE).await.unwrap();
    session.reset();
    r.resolve_description(&mut session, CODE).await.unwrap();
    r.resolve_rubric(&mut session, CODE).await.unwrap();

    assert_eq!(llm.call_count(), 2);
  }

  #[tokio::test]
  async fn missing_variable_aborts_before_calling_service() {
    let llm = ScriptedCompletion::new(["unused"]);
    let r = StandardResolver {
      llm: &llm,
      description_template: "Describe {ccss} for grade {grade}",
      rubric_template: "unused",
      temperature: 0.0,
    };
    let mut session = Session::new();

    let err = r.resolve_description(&mut session, CODE).await.unwrap_err();
    assert!(matches!(err, CoachError::MissingVariable(ref v) if v == "grade"));
    assert_eq!(llm.call_count(), 0);
    assert!(session.description.is_none());
  }

  #[tokio::test]
  async fn service_failure_leaves_artifact_unresolved() {
    let llm = ScriptedCompletion::default();
    llm.push_failure("timeout");
    let prompts = Prompts::default();
    let r = resolver(&llm, &prompts);
    let mut session = Session::new();

    let err = r.resolve_description(&mut session, CODE).await.unwrap_err();
    assert!(matches!(err, CoachError::GenerativeService(_)));
    assert!(session.description.is_none());
  }
}
