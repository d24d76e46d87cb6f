//! Broadcast event bus between the session manager and its consumers.
//!
//! Single-threaded (WASM constraint), interior mutability via RefCell.
//! Each consumer subscribes once and gets its own queue; the manager's
//! events are copied into every live queue and drained by the consumer on
//! its own schedule (typically once per frame). Dropping a `Subscriber`
//! unsubscribes it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use chatdeck_types::event::SessionEvent;

type Queue = RefCell<VecDeque<SessionEvent>>;

/// Publishing side, clone-cheap via Rc.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Weak<Queue>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer. It sees every event emitted from now on.
    pub fn subscribe(&self) -> Subscriber {
        let queue = Rc::new(Queue::default());
        self.subscribers.borrow_mut().push(Rc::downgrade(&queue));
        Subscriber { queue }
    }

    /// Publish an event to every live subscriber. Called by the session manager.
    pub fn emit(&self, event: SessionEvent) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(event.clone());
                true
            }
            None => false,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Receiving side of one consumer
pub struct Subscriber {
    queue: Rc<Queue>,
}

impl Subscriber {
    /// Drain all pending events, oldest first.
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Check if there are pending events (useful for repaint triggers).
    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}
