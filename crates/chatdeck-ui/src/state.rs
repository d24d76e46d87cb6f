//! UI-level state that drives rendering.
//! This is a read-only projection of the session state,
//! updated each frame by draining an EventBus subscriber.

use std::collections::BTreeMap;

use serde::Serialize;
use chatdeck_core::event_bus::Subscriber;
use chatdeck_types::event::SessionEvent;
use chatdeck_types::message::Message;
use chatdeck_types::session::{ChatState, ConnectionStatus};

use crate::deck::DeckCursor;

pub const IDLE_HINT: &str = "Type your question or click an example above";
pub const STREAMING_HINT: &str = "Generating detailed cost optimization analysis...";
pub const TYPING_PLACEHOLDER: &str = "Analyzing your request...";

pub const CREDIT_WARNING_TEXT: &str =
    "Warning: AI credits are running low. You may not be able to send new prompts.";
pub const CREDITS_EXHAUSTED_TEXT: &str = "Credits exhausted. Unable to process new prompts.";
pub const RECONNECT_EXHAUSTED_TEXT: &str = "Connection lost. Reconnect to continue.";

/// State visible to UI consumers
#[derive(Debug, Clone)]
pub struct UiState {
    /// Replica of the session state
    pub chat: ChatState,
    /// Card position for every agent message that has sections, by message id
    pub decks: BTreeMap<String, DeckCursor>,
    /// Input field content
    pub input_text: String,
    /// Status line text
    pub status_text: String,
    /// A prompt was handed to the session and its echo has not come back yet
    pub send_pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    CreditWarning,
    CreditsExhausted,
    ReconnectExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: &'static str,
    pub dismissible: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Serialize)]
pub struct ChatView<'a> {
    pub messages: &'a [Message],
    pub typing_text: Option<&'a str>,
    pub connection: &'static str,
    pub status_text: &'a str,
    pub placeholder: &'static str,
    pub input_disabled: bool,
    pub banners: Vec<Banner>,
    pub decks: &'a BTreeMap<String, DeckCursor>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            chat: ChatState::new(),
            decks: BTreeMap::new(),
            input_text: String::new(),
            status_text: IDLE_HINT.to_string(),
            send_pending: false,
        }
    }

    /// Drain a subscriber and apply what it held. Returns true if anything
    /// changed (repaint trigger).
    pub fn sync(&mut self, events: &Subscriber) -> bool {
        let events = events.drain();
        let changed = !events.is_empty();
        self.process_events(events);
        changed
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            self.chat.apply(&event);

            match event {
                SessionEvent::PromptSent { .. } => {
                    self.send_pending = false;
                    self.status_text = STREAMING_HINT.to_string();
                }
                SessionEvent::TokenAppended { .. } => {
                    self.status_text = STREAMING_HINT.to_string();
                }
                SessionEvent::MessageFinalized { message } => {
                    if let Some(sections) = message.sections.as_ref().filter(|s| !s.is_empty()) {
                        log::debug!("Deck of {} cards for message {}", sections.len(), message.id);
                        self.decks.insert(message.id.clone(), DeckCursor::new(sections.len()));
                    }
                    self.status_text = IDLE_HINT.to_string();
                }
                SessionEvent::StreamAbandoned => {
                    self.clear_pending_send();
                    self.status_text = "Response interrupted by a lost connection".to_string();
                }
                SessionEvent::ReconnectScheduled { attempt, delay_ms } => {
                    self.status_text = format!(
                        "Reconnecting in {}s (attempt {})",
                        delay_ms.div_ceil(1000),
                        attempt
                    );
                }
                SessionEvent::ReconnectExhausted => {
                    self.status_text = "Unable to reach the server".to_string();
                }
                SessionEvent::ConnectionChanged { status: ConnectionStatus::Connected } => {
                    if !self.chat.is_streaming() {
                        self.status_text = IDLE_HINT.to_string();
                    }
                }
                SessionEvent::ConnectionChanged { .. } => {
                    // The session drops prompts it receives while not connected
                    self.clear_pending_send();
                }
                _ => {}
            }
        }
    }

    /// Whether the input is blocked regardless of what's typed
    pub fn input_disabled(&self) -> bool {
        !self.chat.is_connected() || self.chat.credits_exhausted
    }

    /// A prompt queued since the last sync counts as in flight, so two sends
    /// before the session has processed the first cannot both pass.
    pub fn can_send(&self, draft: &str) -> bool {
        !draft.trim().is_empty()
            && !self.input_disabled()
            && !self.chat.is_streaming()
            && !self.send_pending
    }

    /// Claim the send slot for `draft`. Returns the trimmed prompt to queue,
    /// or `None` if sending is blocked right now.
    pub fn begin_send(&mut self, draft: &str) -> Option<String> {
        if !self.can_send(draft) {
            log::warn!("Send blocked ({}, pending: {})", self.connection_label(), self.send_pending);
            return None;
        }
        self.send_pending = true;
        Some(draft.trim().to_string())
    }

    /// Take the trimmed input for sending, if it may be sent now.
    pub fn take_draft(&mut self) -> Option<String> {
        let draft = self.begin_send(&self.input_text.clone())?;
        self.input_text.clear();
        Some(draft)
    }

    fn clear_pending_send(&mut self) {
        if self.send_pending {
            log::debug!("Queued prompt was dropped by the session");
            self.send_pending = false;
        }
    }

    pub fn connection_label(&self) -> &'static str {
        match self.chat.connection {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        if self.input_disabled() {
            "Chat disabled"
        } else {
            "Ask about AI cost optimization..."
        }
    }

    /// The in-progress agent bubble, while a response is streaming
    pub fn typing_text(&self) -> Option<&str> {
        if !self.chat.is_streaming() {
            return None;
        }
        if self.chat.in_flight_text.is_empty() {
            Some(TYPING_PLACEHOLDER)
        } else {
            Some(self.chat.in_flight_text.as_str())
        }
    }

    pub fn banners(&self) -> Vec<Banner> {
        let mut banners = Vec::new();
        if self.chat.credit_warning {
            banners.push(Banner {
                kind: BannerKind::CreditWarning,
                text: CREDIT_WARNING_TEXT,
                dismissible: true,
            });
        }
        if self.chat.credits_exhausted {
            banners.push(Banner {
                kind: BannerKind::CreditsExhausted,
                text: CREDITS_EXHAUSTED_TEXT,
                dismissible: false,
            });
        }
        if self.chat.reconnect_exhausted {
            banners.push(Banner {
                kind: BannerKind::ReconnectExhausted,
                text: RECONNECT_EXHAUSTED_TEXT,
                dismissible: false,
            });
        }
        banners
    }

    pub fn deck(&self, message_id: &str) -> Option<&DeckCursor> {
        self.decks.get(message_id)
    }

    pub fn deck_mut(&mut self, message_id: &str) -> Option<&mut DeckCursor> {
        self.decks.get_mut(message_id)
    }

    pub fn view(&self) -> ChatView<'_> {
        ChatView {
            messages: &self.chat.messages,
            typing_text: self.typing_text(),
            connection: self.connection_label(),
            status_text: &self.status_text,
            placeholder: self.placeholder(),
            input_disabled: self.input_disabled(),
            banners: self.banners(),
            decks: &self.decks,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_streaming() || self.send_pending
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
