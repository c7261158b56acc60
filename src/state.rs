//! Application state: the shared coaching pipeline and the HTTP session store.
//!
//! Sessions are independent: nothing crosses from one to another, and each is
//! guarded by its own mutex that a handler holds for a whole turn, so turns of
//! the same session never interleave. WebSocket connections own their session
//! directly and never register it here.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::config::{load_agent_config_from_env, AgentConfig};
use crate::error::CoachError;
use crate::logic::Coach;
use crate::openai::{Completion, OpenAI};
use crate::session::Session;

pub type SharedSession = Arc<Mutex<Session>>;

pub struct AppState {
    pub coach: Coach,
    pub sessions: RwLock<HashMap<String, SharedSession>>,
}

impl AppState {
    pub fn new(coach: Coach) -> Self {
        Self { coach, sessions: RwLock::new(HashMap::new()) }
    }

    /// Build state from env: load config, init OpenAI. Requires OPENAI_API_KEY.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, String> {
        let cfg: AgentConfig = load_agent_config_from_env().unwrap_or_default();

        let openai = OpenAI::from_env()
            .ok_or_else(|| "OPENAI_API_KEY is not set; the coach cannot run without a generative service".to_string())?;
        info!(target: "writing_coach", base_url = %openai.base_url, model = %openai.model, "OpenAI enabled.");
        info!(
            target: "writing_coach",
            standard = %cfg.standard.code,
            grade = %cfg.standard.grade,
            max_attempts = cfg.gate.max_attempts,
            "Coach configured"
        );

        let llm: Arc<dyn Completion> = Arc::new(openai);
        Ok(Self::new(Coach::new(llm, cfg)))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self) -> SharedSession {
        let session = Session::new();
        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id.clone(), shared.clone());
        info!(target: "session", %id, "Session opened");
        shared
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Result<SharedSession, CoachError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CoachError::UnknownSession(id.to_string()))
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn close_session(&self, id: &str) -> Result<(), CoachError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                info!(target: "session", %id, "Session closed");
                Ok(())
            }
            None => Err(CoachError::UnknownSession(id.to_string())),
        }
    }
}
