//! Coaching configuration: curriculum standard, quality-gate bound, sampling
//! profiles and prompt templates. Defaults live in code; any section can be
//! overridden from a TOML file at AGENT_CONFIG_PATH.
//!
//! Example:
//! ```toml
//! [standard]
//! code = "CCSS.ELA-LITERACY.W.5.9"
//! grade = "5"
//!
//! [gate]
//! max_attempts = 4
//! ```

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub standard: StandardCfg,
  #[serde(default)]
  pub gate: GateCfg,
  #[serde(default)]
  pub sampling: Sampling,
  #[serde(default)]
  pub diagnostics: Diagnostics,
  #[serde(default)]
  pub prompts: Prompts,
}

/// The curriculum standard every question in the process is aligned to.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StandardCfg {
  pub code: String,
  pub link: String,
  pub grade: String,
}

impl Default for StandardCfg {
  fn default() -> Self {
    Self {
      code: "CCSS.ELA-LITERACY.W.4.9".into(),
      link: "https://www.thecorestandards.org/ELA-Literacy/W/4/#CCSS.ELA-Literacy.W.4.9".into(),
      grade: "4".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GateCfg {
  pub max_attempts: usize,
}

impl Default for GateCfg {
  fn default() -> Self { Self { max_attempts: 3 } }
}

/// Temperature profiles: `deterministic` for lookups and quality scoring,
/// `creative` for question authoring, simulated answers and evaluation.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
  pub deterministic: f32,
  pub creative: f32,
}

impl Default for Sampling {
  fn default() -> Self { Self { deterministic: 0.0, creative: 0.7 } }
}

/// Debug-mode switches. Simulated learner answers are a testing aid.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Diagnostics {
  pub simulate_answers: bool,
}

impl Default for Diagnostics {
  fn default() -> Self { Self { simulate_answers: true } }
}

/// Prompt templates. Placeholders are `{name}`; every placeholder must be bound
/// when rendering, see `util::fill_template`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  /// Vars: ccss
  pub description_template: String,
  /// Vars: ccss
  pub rubric_template: String,
  /// Vars: ccss, topic, grade
  pub question_template: String,
  /// Vars: qc_rubric, question
  pub quality_template: String,
  /// Vars: grade, rubric, question, answer
  pub evaluation_template: String,
  /// Vars: grade, question
  pub student_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      description_template: "Provide a description of Common Core standard {ccss}".into(),
      rubric_template: "Provide a concise rubric to evaluate student's responses for Common Core standard {ccss} with a point-based system".into(),
      question_template: r#"You are a creator of open-ended questions for students to test Common Core standard {ccss} related to topic "{topic}". Provide the following:
Introduction
Context
Question

The introduction, context, and question should be self-contained. It should be possible to answer the question with only the information in the introduction and context, no additional external information should be needed. Do not reference external sources in the introduction and context. The difficulty level of the introduction, context, and question should match grade level {grade} of the student."#.into(),
      quality_template: r#"You evaluate the quality of questions based on a given rubric.
Given the rubric:
{qc_rubric}
Given the question:
{question}
determine a total score of the given question. If the score is below 60, then end the output with the word 'qc failed', otherwise end the output with the word 'qc succeeded'."#.into(),
      evaluation_template: r#"You are someone who evaluates answers given by students in grade {grade} on open-ended questions using a given rubric.
Given the rubric:
{rubric}
Given the question:
{question}
Given the answer:
{answer}
provide an evaluation of the given answer including a total score based on the given rubric. Add "answer is wrong" if the total score is lower than half of the maximum score possible. Add "answer is right" otherwise. Also provide some feedback to the student on how he or she can improve the answer. Ensure that the evaluation and feedback provided are on the grade level of the student."#.into(),
      student_template: r#"You are a student in grade {grade}. You received the following question. Please answer it.

{question}"#.into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "writing_coach", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "writing_coach", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "writing_coach", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
