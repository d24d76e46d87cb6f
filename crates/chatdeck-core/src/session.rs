//! Session manager: the streaming state machine.
//!
//! Owns the single backend connection and the reconnect timer, and turns
//! every `SessionInput` into state transitions:
//! 1. Transport callbacks (opened / frame / closed) arrive tagged with the
//!    connection they belong to; anything from a replaced connection is dropped
//! 2. Frames are decoded into `ServerMessage`s and folded into the state
//! 3. Unexpected closes schedule a fixed-delay reconnect until the retry
//!    budget is spent
//!
//! Each transition is an `SessionEvent` applied to the manager's own
//! `ChatState` and published on the `EventBus`, so subscribers can keep an
//! exact replica.

use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use chatdeck_types::{
    config::SessionConfig,
    event::{ClientMessage, ConnectionId, SessionCommand, SessionEvent, SessionInput, ServerMessage},
    message::{Message, MessageIds},
    session::{ChatState, ConnectionStatus},
};
use crate::event_bus::EventBus;
use crate::ports::*;
use crate::sections::parse_deck_sections;

pub const ERROR_FALLBACK: &str = "An error occurred";

/// Receiving half of the session's input channel
pub type InputReceiver = UnboundedReceiver<SessionInput>;

/// Create the channel every session input flows through.
pub fn input_channel() -> (InputSender, InputReceiver) {
    mpsc::unbounded()
}

struct ActiveConnection {
    id: ConnectionId,
    handle: Box<dyn ConnectionHandle>,
}

pub struct SessionManager {
    config: SessionConfig,
    transport: Box<dyn TransportPort>,
    timer: Box<dyn TimerPort>,
    inputs: InputSender,
    bus: EventBus,
    state: ChatState,
    connection: Option<ActiveConnection>,
    next_conn: u64,
    reconnect_timer: Option<Box<dyn TimerHandle>>,
    ids: MessageIds,
    torn_down: bool,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        transport: Box<dyn TransportPort>,
        timer: Box<dyn TimerPort>,
        inputs: InputSender,
        bus: EventBus,
    ) -> Self {
        Self {
            config,
            transport,
            timer,
            inputs,
            bus,
            state: ChatState::new(),
            connection: None,
            next_conn: 1,
            reconnect_timer: None,
            ids: MessageIds::new(),
            torn_down: false,
        }
    }

    /// Current state, read-only
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn snapshot(&self) -> ChatState {
        self.state.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect_timer.is_some()
    }

    /// Single entry point for everything the session reacts to.
    pub fn dispatch(&mut self, input: SessionInput) {
        if self.torn_down {
            log::debug!("Session torn down, ignoring {:?}", input);
            return;
        }

        match input {
            SessionInput::Opened { conn } => self.on_opened(conn),
            SessionInput::Frame { conn, text } => self.on_frame(conn, &text),
            SessionInput::Closed { conn } => self.on_closed(conn),
            SessionInput::ReconnectDue => self.on_reconnect_due(),
            SessionInput::Command(cmd) => match cmd {
                SessionCommand::Connect => self.connect(),
                SessionCommand::Reconnect => self.reconnect(),
                SessionCommand::SendMessage(text) => self.send_message(&text),
                SessionCommand::DismissCreditWarning => self.dismiss_credit_warning(),
                SessionCommand::Teardown => self.teardown(),
            },
        }
    }

    // ─── Operations ──────────────────────────────────────────

    /// Open the backend connection. Does nothing if one is already open or
    /// opening.
    pub fn connect(&mut self) {
        if self.torn_down {
            log::warn!("connect() after teardown ignored");
            return;
        }
        if self.connection.is_some() {
            log::debug!("Connection already open or opening");
            return;
        }

        self.cancel_reconnect_timer();

        let id = ConnectionId(self.next_conn);
        self.next_conn += 1;
        let url = self.config.endpoint();
        log::info!("Connecting to WebSocket: {}", url);
        self.commit(SessionEvent::ConnectionChanged { status: ConnectionStatus::Connecting });

        match self.transport.open(&url, ConnectionLink::new(id, self.inputs.clone())) {
            Ok(handle) => self.connection = Some(ActiveConnection { id, handle }),
            Err(e) => {
                log::error!("Error connecting to WebSocket: {}", e);
                self.connection_lost();
            }
        }
    }

    /// Send a user prompt. No-op unless the connection is open.
    pub fn send_message(&mut self, text: &str) {
        if self.torn_down || !self.state.is_connected() || self.connection.is_none() {
            log::warn!("Not connected, dropping outgoing message");
            return;
        }

        let frame = match (ClientMessage::UserPrompt { text: text.to_string() }).encode() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Failed to encode prompt: {}", e);
                return;
            }
        };

        let message = Message::user(self.ids.next_id(), text);
        self.commit(SessionEvent::PromptSent { message });

        if let Some(active) = &self.connection {
            if let Err(e) = active.handle.send_text(&frame) {
                // The transport reports the close separately
                log::error!("Failed to send prompt: {}", e);
            }
        }
    }

    pub fn dismiss_credit_warning(&mut self) {
        if self.state.credit_warning {
            self.commit(SessionEvent::CreditWarningChanged { active: false });
        }
    }

    /// Explicit re-initiation by the UI, typically after the retry budget
    /// ran out. Starts a fresh budget.
    pub fn reconnect(&mut self) {
        if self.torn_down {
            return;
        }
        self.cancel_reconnect_timer();
        if self.state.reconnect_attempts > 0 || self.state.reconnect_exhausted {
            self.commit(SessionEvent::ReconnectReset);
        }
        self.connect();
    }

    /// Cancel the reconnect timer and close the connection. Safe to call
    /// more than once and before any connection was made.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.cancel_reconnect_timer();

        if let Some(mut active) = self.connection.take() {
            log::info!("Closing WebSocket connection {:?}", active.id);
            active.handle.close();
        }
        if self.state.is_streaming() {
            self.commit(SessionEvent::StreamAbandoned);
        }
        if self.state.connection != ConnectionStatus::Disconnected {
            self.commit(SessionEvent::ConnectionChanged { status: ConnectionStatus::Disconnected });
        }
        log::info!("Session torn down");
    }

    // ─── Input handlers ──────────────────────────────────────

    fn is_current(&self, conn: ConnectionId) -> bool {
        self.connection.as_ref().is_some_and(|active| active.id == conn)
    }

    fn on_opened(&mut self, conn: ConnectionId) {
        if !self.is_current(conn) {
            log::debug!("Ignoring open from stale connection {:?}", conn);
            return;
        }
        log::info!("WebSocket connected");
        self.commit(SessionEvent::ConnectionChanged { status: ConnectionStatus::Connected });
    }

    fn on_frame(&mut self, conn: ConnectionId, text: &str) {
        if !self.is_current(conn) {
            log::debug!("Ignoring frame from stale connection {:?}", conn);
            return;
        }

        match ServerMessage::decode(text) {
            Ok(ServerMessage::Unrecognized) => {
                log::warn!("Unknown message type: {}", text);
            }
            Ok(message) => self.on_server_message(message),
            Err(e) => {
                log::error!("Error parsing WebSocket message: {}", e);
            }
        }
    }

    fn on_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::AiToken { text } => {
                self.commit(SessionEvent::TokenAppended { text: text.unwrap_or_default() });
            }
            ServerMessage::AiDone => self.finalize_response(),
            ServerMessage::Error { message } => {
                let detail = message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| ERROR_FALLBACK.to_string());
                let message = Message::agent(self.ids.next_id(), format!("Error: {}", detail), None);
                self.commit(SessionEvent::MessageFinalized { message });
            }
            ServerMessage::CreditWarning => {
                if !self.state.credit_warning {
                    self.commit(SessionEvent::CreditWarningChanged { active: true });
                }
            }
            ServerMessage::CreditsExhausted => {
                if !self.state.credits_exhausted {
                    self.commit(SessionEvent::CreditsExhausted);
                }
            }
            ServerMessage::Unrecognized => {}
        }
    }

    fn finalize_response(&mut self) {
        if !self.state.is_streaming() && self.state.in_flight_text.is_empty() {
            log::warn!("AI_DONE with no response in flight, ignoring");
            return;
        }

        let text = self.state.in_flight_text.clone();
        let sections = parse_deck_sections(&text);
        let message = Message::agent(self.ids.next_id(), text, sections);
        self.commit(SessionEvent::MessageFinalized { message });
    }

    fn on_closed(&mut self, conn: ConnectionId) {
        if !self.is_current(conn) {
            log::debug!("Ignoring close from stale connection {:?}", conn);
            return;
        }
        log::info!("WebSocket disconnected");
        self.connection_lost();
    }

    fn on_reconnect_due(&mut self) {
        if self.reconnect_timer.take().is_none() {
            log::debug!("Reconnect timer already cancelled");
            return;
        }
        log::info!("Reconnecting... Attempt {}", self.state.reconnect_attempts);
        self.connect();
    }

    // ─── Internals ───────────────────────────────────────────

    /// Shared path for an unexpected close and a failed open: abandon any
    /// in-flight response and schedule a retry while budget remains.
    fn connection_lost(&mut self) {
        if let Some(mut active) = self.connection.take() {
            active.handle.close();
        }
        if self.state.connection != ConnectionStatus::Disconnected {
            self.commit(SessionEvent::ConnectionChanged { status: ConnectionStatus::Disconnected });
        }
        if self.state.is_streaming() || !self.state.in_flight_text.is_empty() {
            self.commit(SessionEvent::StreamAbandoned);
        }

        let attempts = self.state.reconnect_attempts;
        if attempts < self.config.max_reconnect_attempts {
            let attempt = attempts + 1;
            let delay_ms = self.config.reconnect_delay_ms;
            self.commit(SessionEvent::ReconnectScheduled { attempt, delay_ms });
            self.reconnect_timer = Some(self.timer.schedule(delay_ms, self.inputs.clone()));
        } else if !self.state.reconnect_exhausted {
            log::error!("Max reconnection attempts reached");
            self.commit(SessionEvent::ReconnectExhausted);
        }
    }

    fn cancel_reconnect_timer(&mut self) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.cancel();
        }
    }

    fn commit(&mut self, event: SessionEvent) {
        self.state.apply(&event);
        self.bus.emit(event);
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drive a session: process inputs one at a time, in delivery order, until
/// the session is torn down.
///
/// Must be spawned via `wasm_bindgen_futures::spawn_local` in the browser.
pub async fn run(mut manager: SessionManager, mut inputs: InputReceiver) {
    while let Some(input) = inputs.next().await {
        manager.dispatch(input);
        if manager.is_torn_down() {
            break;
        }
    }
    log::debug!("Session loop finished");
}
