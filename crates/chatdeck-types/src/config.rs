use serde::{Deserialize, Serialize};

use crate::{DeckError, Result};

/// Connection settings for one chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Backend host (and optional port), e.g. `api.example.com`
    pub host: String,
    pub scheme: String,
    pub path: String,
    pub max_reconnect_attempts: u32,
    /// Fixed spacing between reconnect attempts, no backoff
    pub reconnect_delay_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            scheme: DEFAULT_SCHEME.to_string(),
            path: DEFAULT_PATH.to_string(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

impl SessionConfig {
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Full WebSocket URL, `<scheme>://<host><path>`
    pub fn endpoint(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DeckError::Config("host is not set".to_string()));
        }
        if !matches!(self.scheme.as_str(), "ws" | "wss") {
            return Err(DeckError::Config(format!(
                "unsupported scheme: {}",
                self.scheme
            )));
        }
        if !self.path.starts_with('/') {
            return Err(DeckError::Config(format!(
                "path must start with '/': {}",
                self.path
            )));
        }
        Ok(())
    }
}

pub const DEFAULT_SCHEME: &str = "wss";
pub const DEFAULT_PATH: &str = "/ws/chat/";
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RECONNECT_DELAY_MS: u32 = 2000;
