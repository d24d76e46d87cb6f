//! WebSocket transport: bridges the browser's `WebSocket` to the session.
//!
//! Every browser callback is forwarded through the `ConnectionLink` as a
//! `SessionInput`; nothing here touches session state. Only text frames are
//! part of the protocol. Binary frames are logged and dropped.
//!
//! Handlers are owned by the connection handle and detached before the
//! socket is closed, so a close initiated by the session is never reported
//! back as an unexpected one.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{BinaryType, CloseEvent, Event, MessageEvent, WebSocket};

use chatdeck_core::ports::{ConnectionHandle, ConnectionLink, TransportPort};
use chatdeck_types::{DeckError, Result};

/// Opens one `web_sys::WebSocket` per `open` call.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserWebSocket;

impl BrowserWebSocket {
    pub fn new() -> Self {
        Self
    }
}

impl TransportPort for BrowserWebSocket {
    fn open(&self, url: &str, link: ConnectionLink) -> Result<Box<dyn ConnectionHandle>> {
        let ws = WebSocket::new(url)
            .map_err(|e| DeckError::Transport(format!("Failed to open {}: {:?}", url, e)))?;
        ws.set_binary_type(BinaryType::Arraybuffer);

        let conn = link.id();

        let onopen = {
            let link = link.clone();
            Closure::wrap(Box::new(move |_event: Event| {
                link.opened();
            }) as Box<dyn FnMut(Event)>)
        };

        let onmessage = {
            let link = link.clone();
            Closure::wrap(Box::new(move |event: MessageEvent| {
                let data = event.data();
                match data.as_string() {
                    Some(text) => link.frame(text),
                    None => {
                        let len = data
                            .dyn_ref::<js_sys::ArrayBuffer>()
                            .map(|buf| buf.byte_length())
                            .unwrap_or(0);
                        log::warn!("Ignoring binary WebSocket frame ({} bytes) on {:?}", len, conn);
                    }
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };

        let onclose = {
            let link = link.clone();
            Closure::wrap(Box::new(move |event: CloseEvent| {
                log::info!(
                    "WebSocket {:?} closed (code {}, clean: {}) {}",
                    conn,
                    event.code(),
                    event.was_clean(),
                    event.reason()
                );
                link.closed();
            }) as Box<dyn FnMut(CloseEvent)>)
        };

        // The browser always follows an error with a close, which is what
        // drives the reconnect.
        let onerror = Closure::wrap(Box::new(move |_event: Event| {
            log::error!("WebSocket error on {:?}", conn);
        }) as Box<dyn FnMut(Event)>);

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(Box::new(BrowserConnection {
            ws,
            handlers: Some(Handlers {
                _onopen: onopen,
                _onmessage: onmessage,
                _onclose: onclose,
                _onerror: onerror,
            }),
        }))
    }
}

struct Handlers {
    _onopen: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
}

pub struct BrowserConnection {
    ws: WebSocket,
    /// `None` once the connection has been closed from our side
    handlers: Option<Handlers>,
}

impl BrowserConnection {
    fn detach(&self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
    }
}

impl ConnectionHandle for BrowserConnection {
    fn send_text(&self, text: &str) -> Result<()> {
        if self.ws.ready_state() != WebSocket::OPEN {
            return Err(DeckError::Transport(format!(
                "socket not open (ready state {})",
                self.ws.ready_state()
            )));
        }
        self.ws
            .send_with_str(text)
            .map_err(|e| DeckError::Transport(format!("send failed: {:?}", e)))
    }

    fn close(&mut self) {
        let Some(handlers) = self.handlers.take() else {
            return;
        };
        // Handlers must be detached before the closures are freed
        self.detach();
        drop(handlers);

        if let Err(e) = self.ws.close() {
            log::warn!("Failed to close WebSocket: {:?}", e);
        }
    }
}

impl Drop for BrowserConnection {
    fn drop(&mut self) {
        self.close();
    }
}
