pub mod event_bus;
pub mod ports;
pub mod sections;
pub mod session;


pub use event_bus::{EventBus, Subscriber};
pub use sections::parse_deck_sections;
pub use session::{run, input_channel, SessionManager};
