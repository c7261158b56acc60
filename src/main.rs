//! Writing Coach · quality-gated question tutoring backend
//!
//! - Generates a grade-appropriate open-ended question for a fixed curriculum
//!   standard, gates it through an LLM quality check (bounded retries), and
//!   evaluates the learner's answer against the standard's rubric
//! - Axum HTTP + WebSocket API
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   OPENAI_API_KEY    : required
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-4"
//!   AGENT_CONFIG_PATH : path to TOML config (standard, gate, sampling, prompts)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod verdict;
mod config;
mod session;
mod openai;
mod resolver;
mod gate;
mod generator;
mod evaluator;
mod logic;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared coaching pipeline (OpenAI client, prompts, standard) + session store.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "writing_coach", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "writing_coach", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "writing_coach", "Shutdown signal received");
}
