//! WebSocket upgrade + message loop. The connection owns one session for its
//! lifetime. Each client message is parsed as JSON and forwarded to core
//! logic; we reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{self, Coach};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::Session;
use crate::state::AppState;

#[instrument(level = "info", skip(state, ws))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "writing_coach", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let mut session = Session::new();
  info!(target: "session", id = %session.id, "WebSocket connected");

  // Initial render: resolves the standard's description and rubric.
  let hello = handle_client_ws(ClientWsMessage::Refresh, &state.coach, &mut session).await;
  if send_json(&mut socket, &hello).await.is_err() {
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "writing_coach", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state.coach, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        if send_json(&mut socket, &reply_msg).await.is_err() {
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "session", id = %session.id, "WebSocket disconnected");
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "writing_coach", error = %e, "WS send error");
    e
  })
}

#[instrument(level = "info", skip(msg, coach, session), fields(session_id = %session.id))]
async fn handle_client_ws(msg: ClientWsMessage, coach: &Coach, session: &mut Session) -> ServerWsMessage {
  let result = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,
    ClientWsMessage::Refresh => logic::run_turn(coach, session).await,
    ClientWsMessage::Topic { topic } => logic::submit_topic(coach, session, &topic).await,
    ClientWsMessage::Answer { answer } => logic::submit_answer(coach, session, &answer).await,
    ClientWsMessage::SimulateAnswer => logic::simulate_answer(coach, session).await,
    ClientWsMessage::Reset => logic::reset(coach, session).await,
  };

  match result {
    Ok(report) => ServerWsMessage::Turn { report },
    Err(e) => {
      error!(target: "writing_coach", error = %e, "WS turn failed");
      ServerWsMessage::Error { message: e.to_string() }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::logic::tests::coach_with;
  use crate::openai::testing::ScriptedCompletion;

  #[tokio::test]
  async fn messages_drive_the_connection_session() {
    let llm = Arc::new(ScriptedCompletion::new([
      "desc", "rubric", "q1", "Score 30 qc failed", "q2", "Score 80 qc succeeded",
    ]));
    let coach = coach_with(llm.clone());
    let mut session = Session::new();

    let reply = handle_client_ws(ClientWsMessage::Topic { topic: "baseball".into() }, &coach, &mut session).await;

    match reply {
      ServerWsMessage::Turn { report } => {
        assert_eq!(report.question.as_deref(), Some("q2"));
        assert_eq!(report.attempts.len(), 2);
      }
      other => panic!("unexpected reply: {other:?}"),
    }
    assert_eq!(llm.call_count(), 6);
  }

  #[tokio::test]
  async fn failures_become_error_messages() {
    let coach = coach_with(Arc::new(ScriptedCompletion::default()));
    let mut session = Session::new();

    let reply = handle_client_ws(ClientWsMessage::Refresh, &coach, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Error { .. }));

    let reply = handle_client_ws(ClientWsMessage::Ping, &coach, &mut session).await;
    assert!(matches!(reply, ServerWsMessage::Pong));
  }
}
