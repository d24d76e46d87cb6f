pub mod timer;
pub mod websocket;

pub use timer::BrowserTimer;
pub use websocket::BrowserWebSocket;
