//! Reconnect timer backed by `setTimeout` via gloo-timers.

use gloo_timers::callback::Timeout;

use chatdeck_core::ports::{deliver, InputSender, TimerHandle, TimerPort};
use chatdeck_types::event::SessionInput;

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimer;

impl BrowserTimer {
    pub fn new() -> Self {
        Self
    }
}

impl TimerPort for BrowserTimer {
    fn schedule(&self, delay_ms: u32, inputs: InputSender) -> Box<dyn TimerHandle> {
        log::debug!("Reconnect timer armed for {}ms", delay_ms);
        let timeout = Timeout::new(delay_ms, move || {
            deliver(&inputs, SessionInput::ReconnectDue);
        });
        Box::new(PendingTimeout(timeout))
    }
}

/// Dropping a gloo `Timeout` clears it as well; `cancel` makes it explicit.
struct PendingTimeout(Timeout);

impl TimerHandle for PendingTimeout {
    fn cancel(self: Box<Self>) {
        let _callback = self.0.cancel();
        log::debug!("Reconnect timer cancelled");
    }
}
