use serde::{Deserialize, Serialize};

/// Who authored a message in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One card of a structured agent response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSection {
    pub heading: String,
    pub body: String,
}

impl DeckSection {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

/// A finalized transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    /// RFC 3339
    pub timestamp: String,
    /// Present only on agent messages with at least two parsed sections
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sections: Option<Vec<DeckSection>>,
}

impl Message {
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            sections: None,
        }
    }

    pub fn agent(
        id: impl Into<String>,
        text: impl Into<String>,
        sections: Option<Vec<DeckSection>>,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::Agent,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            sections,
        }
    }

    pub fn has_sections(&self) -> bool {
        self.sections.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Hands out message ids of the form `<unix-millis>-<sequence>`.
///
/// The millisecond prefix keeps ids roughly time-ordered; the sequence keeps
/// them unique when two messages land in the same millisecond.
#[derive(Debug, Default)]
pub struct MessageIds {
    next: u64,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let seq = self.next;
        self.next += 1;
        format!("{}-{}", chrono::Utc::now().timestamp_millis(), seq)
    }
}
