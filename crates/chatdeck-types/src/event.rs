use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;
use crate::session::ConnectionStatus;
use crate::{DeckError, Result};

// ─── Wire protocol ───────────────────────────────────────────

/// Frames sent from the client to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    UserPrompt { text: String },
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames pushed by the backend, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// One fragment of a streaming response
    AiToken {
        #[serde(default)]
        text: Option<String>,
    },
    /// Stream complete; finalize the accumulated text
    AiDone,
    /// Stream failed
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    CreditWarning,
    CreditsExhausted,
    /// Any `type` this client does not know about
    #[serde(other)]
    Unrecognized,
}

impl ServerMessage {
    /// Decode a raw text frame. Frames that are not a JSON object with a
    /// string `type` are protocol errors.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        match value.get("type") {
            Some(Value::String(_)) => Ok(serde_json::from_value(value)?),
            Some(other) => Err(DeckError::Protocol(format!(
                "message type must be a string, got {}",
                other
            ))),
            None => Err(DeckError::Protocol("message has no type".to_string())),
        }
    }
}

// ─── Session inputs ──────────────────────────────────────────

/// Identifies one opened connection, so deliveries from a connection that
/// has since been replaced can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

/// Requests coming from the UI side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Connect,
    Reconnect,
    SendMessage(String),
    DismissCreditWarning,
    Teardown,
}

/// Everything the session manager reacts to. Transport callbacks, timer
/// expiries and UI commands all arrive as one of these, in order, through
/// a single channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Opened { conn: ConnectionId },
    Frame { conn: ConnectionId, text: String },
    Closed { conn: ConnectionId },
    ReconnectDue,
    Command(SessionCommand),
}

// ─── Published events ────────────────────────────────────────

/// State transitions published by the session manager.
/// Applying them in order to a `ChatState` reproduces the manager's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    ConnectionChanged { status: ConnectionStatus },

    /// Optimistic echo of a prompt that was just transmitted
    PromptSent { message: Message },

    /// A fragment was appended to the in-flight buffer
    TokenAppended { text: String },

    /// A response (or error) was finalized into the transcript
    MessageFinalized { message: Message },

    /// The in-flight response was dropped because the connection went away
    StreamAbandoned,

    CreditWarningChanged { active: bool },

    CreditsExhausted,

    ReconnectScheduled { attempt: u32, delay_ms: u32 },

    /// Retry budget spent; no further automatic attempts
    ReconnectExhausted,

    /// Explicit reconnect requested; the retry budget starts over
    ReconnectReset,
}
