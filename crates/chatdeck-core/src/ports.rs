//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `chatdeck-core` (pure Rust).
//! Implementations live in `chatdeck-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.
//!
//! Adapters never touch session state directly. Everything they observe is
//! reported back as a `SessionInput` on the session's input channel.

use futures::channel::mpsc::UnboundedSender;
use chatdeck_types::{
    Result,
    event::{ConnectionId, SessionInput},
};

/// Sending half of the session's input channel
pub type InputSender = UnboundedSender<SessionInput>;

/// Push an input into the session channel. A closed channel means the
/// session has been torn down, so the input is dropped.
pub fn deliver(inputs: &InputSender, input: SessionInput) {
    if inputs.unbounded_send(input).is_err() {
        log::debug!("Session input channel closed, dropping input");
    }
}

// ─── Transport Port ──────────────────────────────────────────

/// Callback side of one connection, handed to the transport on open.
/// Every delivery is tagged with the connection's id.
#[derive(Clone)]
pub struct ConnectionLink {
    conn: ConnectionId,
    inputs: InputSender,
}

impl ConnectionLink {
    pub fn new(conn: ConnectionId, inputs: InputSender) -> Self {
        Self { conn, inputs }
    }

    pub fn id(&self) -> ConnectionId {
        self.conn
    }

    /// The connection finished its handshake
    pub fn opened(&self) {
        deliver(&self.inputs, SessionInput::Opened { conn: self.conn });
    }

    /// A text frame arrived
    pub fn frame(&self, text: String) {
        deliver(&self.inputs, SessionInput::Frame { conn: self.conn, text });
    }

    /// The connection is gone, for whatever reason
    pub fn closed(&self) {
        deliver(&self.inputs, SessionInput::Closed { conn: self.conn });
    }
}

pub trait TransportPort {
    /// Start opening a connection to `url`. Returns as soon as the attempt
    /// is under way; completion, frames and closure are reported through
    /// `link`. An `Err` means the attempt could not even be started.
    fn open(&self, url: &str, link: ConnectionLink) -> Result<Box<dyn ConnectionHandle>>;
}

/// An open (or opening) connection, exclusively owned by the session
pub trait ConnectionHandle {
    /// Transmit one text frame
    fn send_text(&self, text: &str) -> Result<()>;

    /// Close the connection without reporting the closure back
    fn close(&mut self);
}

// ─── Timer Port ──────────────────────────────────────────────

pub trait TimerPort {
    /// Deliver `SessionInput::ReconnectDue` after `delay_ms`
    fn schedule(&self, delay_ms: u32, inputs: InputSender) -> Box<dyn TimerHandle>;
}

/// A pending timer. Cancelling guarantees the input is never delivered.
pub trait TimerHandle {
    fn cancel(self: Box<Self>);
}
