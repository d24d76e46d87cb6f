//! `ChatClient`, the JS-facing handle on one chat session.
//!
//! Owns the UI projection and the sending half of the session's input
//! channel. The session itself runs on `spawn_local`; every call here is
//! turned into a `SessionCommand` and queued behind whatever transport and
//! timer inputs are already pending.

use gloo_utils::format::JsValueSerdeExt;
use wasm_bindgen::prelude::*;

use chatdeck_core::event_bus::{EventBus, Subscriber};
use chatdeck_core::ports::{deliver, InputSender};
use chatdeck_core::session::{self, input_channel, SessionManager};
use chatdeck_platform::{BrowserTimer, BrowserWebSocket};
use chatdeck_types::config::SessionConfig;
use chatdeck_types::event::{SessionCommand, SessionInput};
use chatdeck_types::DeckError;
use chatdeck_ui::state::UiState;

use crate::to_js;

#[wasm_bindgen]
pub struct ChatClient {
    inputs: InputSender,
    events: Subscriber,
    ui: UiState,
    torn_down: bool,
}

#[wasm_bindgen]
impl ChatClient {
    /// Start a session against `wss://<host>/ws/chat/` and begin connecting.
    #[wasm_bindgen(constructor)]
    pub fn new(host: &str) -> Result<ChatClient, JsValue> {
        let config = SessionConfig::for_host(host);
        config.validate().map_err(to_js)?;

        let bus = EventBus::new();
        let events = bus.subscribe();
        let (inputs, receiver) = input_channel();

        let manager = SessionManager::new(
            config,
            Box::new(BrowserWebSocket::new()),
            Box::new(BrowserTimer::new()),
            inputs.clone(),
            bus,
        );
        wasm_bindgen_futures::spawn_local(session::run(manager, receiver));

        let client = Self {
            inputs,
            events,
            ui: UiState::new(),
            torn_down: false,
        };
        client.command(SessionCommand::Connect);
        log::info!("Chat client created for {}", host);
        Ok(client)
    }

    /// Queue a prompt. Returns false (and sends nothing) if the UI rules
    /// block sending right now.
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&mut self, text: &str) -> bool {
        self.sync();
        match self.ui.begin_send(text) {
            Some(prompt) => {
                self.command(SessionCommand::SendMessage(prompt));
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = dismissCreditWarning)]
    pub fn dismiss_credit_warning(&self) {
        self.command(SessionCommand::DismissCreditWarning);
    }

    /// Start over after the automatic retries gave up.
    pub fn reconnect(&self) {
        self.command(SessionCommand::Reconnect);
    }

    /// Current view as a plain JS object.
    pub fn snapshot(&mut self) -> Result<JsValue, JsValue> {
        self.sync();
        JsValue::from_serde(&self.ui.view()).map_err(|e| to_js(DeckError::from(e)))
    }

    #[wasm_bindgen(js_name = canSend)]
    pub fn can_send(&mut self, draft: &str) -> bool {
        self.sync();
        self.ui.can_send(draft)
    }

    /// Advance the deck of message `id`. False at the last card or for a
    /// message without sections.
    #[wasm_bindgen(js_name = nextCard)]
    pub fn next_card(&mut self, id: &str) -> bool {
        self.sync();
        self.ui.deck_mut(id).is_some_and(|deck| deck.next())
    }

    #[wasm_bindgen(js_name = previousCard)]
    pub fn previous_card(&mut self, id: &str) -> bool {
        self.sync();
        self.ui.deck_mut(id).is_some_and(|deck| deck.previous())
    }

    /// Close the connection and cancel pending reconnects. Also happens on
    /// `free()`.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.command(SessionCommand::Teardown);
    }
}

impl ChatClient {
    fn command(&self, command: SessionCommand) {
        deliver(&self.inputs, SessionInput::Command(command));
    }

    fn sync(&mut self) {
        self.ui.sync(&self.events);
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.teardown();
    }
}
