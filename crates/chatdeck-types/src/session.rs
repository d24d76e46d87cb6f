use serde::{Deserialize, Serialize};

use crate::event::SessionEvent;
use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StreamingStatus {
    #[default]
    Idle,
    Streaming,
}

/// Live state of one chat session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub connection: ConnectionStatus,
    pub streaming: StreamingStatus,
    /// Only meaningful while `streaming == Streaming`
    pub in_flight_text: String,
    pub credit_warning: bool,
    pub credits_exhausted: bool,
    pub reconnect_attempts: u32,
    pub reconnect_exhausted: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionStatus::Connected
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming == StreamingStatus::Streaming
    }

    /// Fold one event into the state. This is the only place `ChatState`
    /// changes.
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ConnectionChanged { status } => {
                self.connection = *status;
                if *status == ConnectionStatus::Connected {
                    self.reconnect_attempts = 0;
                    self.reconnect_exhausted = false;
                }
            }
            SessionEvent::PromptSent { message } => {
                self.messages.push(message.clone());
                self.in_flight_text.clear();
                self.streaming = StreamingStatus::Streaming;
            }
            SessionEvent::TokenAppended { text } => {
                self.in_flight_text.push_str(text);
                self.streaming = StreamingStatus::Streaming;
            }
            SessionEvent::MessageFinalized { message } => {
                self.messages.push(message.clone());
                self.in_flight_text.clear();
                self.streaming = StreamingStatus::Idle;
            }
            SessionEvent::StreamAbandoned => {
                self.in_flight_text.clear();
                self.streaming = StreamingStatus::Idle;
            }
            SessionEvent::CreditWarningChanged { active } => {
                self.credit_warning = *active;
            }
            SessionEvent::CreditsExhausted => {
                self.credits_exhausted = true;
            }
            SessionEvent::ReconnectScheduled { attempt, .. } => {
                self.reconnect_attempts = *attempt;
            }
            SessionEvent::ReconnectExhausted => {
                self.reconnect_exhausted = true;
            }
            SessionEvent::ReconnectReset => {
                self.reconnect_attempts = 0;
                self.reconnect_exhausted = false;
            }
        }
    }
}
