//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{AttemptReport, Evaluation, Standard};

/// Messages the client can send over WebSocket. The connection owns one
/// session for its whole lifetime.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Refresh,
    Topic { topic: String },
    Answer { answer: String },
    SimulateAnswer,
    Reset,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Turn { report: TurnReport },
    Error { message: String },
}

/// Everything the learner-facing surface shows after one turn.
#[derive(Debug, Serialize)]
pub struct TurnReport {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub standard: Standard,
    pub description: String,
    pub rubric: String,
    pub quality_rubric: String,
    pub topic: String,
    /// Only ever a question that passed the quality gate.
    pub question: Option<String>,
    /// Quality verdicts of the attempts made during this turn (diagnostic).
    pub attempts: Vec<AttemptReport>,
    pub warning: Option<String>,
    pub answer: String,
    pub evaluation: Option<Evaluation>,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct TopicIn {
    pub topic: String,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
