//! Deck-section extraction.
//!
//! Recovers numbered sections (`1. Title` / `## 1. Title`) from a finished
//! agent response so it can be shown as a sequence of cards. The scan is a
//! heuristic with two passes: collect every heading match, then filter out
//! spans that are too thin to be real sections. Anything with fewer than two
//! surviving sections is reported as unstructured.

use std::borrow::Cow;
use std::sync::LazyLock;

use chatdeck_types::message::DeckSection;
use regex::Regex;
use serde_json::Value;

/// Fewer sections than this is treated as plain prose.
pub const MIN_SECTIONS: usize = 2;

/// Bodies shorter than this (in characters) are noise unless they hold a
/// table row or a bullet.
pub const MIN_BODY_CHARS: usize = 10;

/// Lead-in text must be longer than this to become a synthesized snapshot.
const MIN_LEAD_IN_CHARS: usize = 50;

pub const EXECUTIVE_SNAPSHOT: &str = "Executive Snapshot";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\n)(?:##\s*)?([0-9]+)\.\s+([^\n]+)")
        .expect("sections: static regex pattern must compile")
});

static ENVELOPE_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""response":\s*"([^"]+)""#)
        .expect("sections: static regex pattern must compile")
});

static SNAPSHOT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Executive Snapshot\*\*\s*")
        .expect("sections: static regex pattern must compile")
});

static LEADING_HASHES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#+\s*").expect("sections: static regex pattern must compile")
});

/// Split a completed response into deck sections.
///
/// Returns `None` when fewer than two sections survive filtering; callers
/// then render the text as-is. Pure and deterministic.
pub fn parse_deck_sections(text: &str) -> Option<Vec<DeckSection>> {
    let clean = normalize(text);
    let clean = clean.as_ref();

    let headings: Vec<Heading<'_>> = HEADING_RE
        .captures_iter(clean)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Heading {
                start: whole.start(),
                end: whole.end(),
                number: caps.get(1)?.as_str(),
                title: caps.get(2)?.as_str().trim(),
            })
        })
        .collect();

    log::debug!("Found {} numbered section headings", headings.len());

    if headings.len() < MIN_SECTIONS {
        return None;
    }

    let mut sections = Vec::with_capacity(headings.len() + 1);

    if let Some(snapshot) = lead_in_snapshot(&clean[..headings[0].start]) {
        sections.push(snapshot);
    }

    for (i, heading) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(clean.len(), |next| next.start);
        let body = clean_body(&clean[heading.end..body_end]);

        if is_noise(&body) {
            continue;
        }

        sections.push(DeckSection {
            heading: format!("{}. {}", heading.number, heading.title),
            body,
        });
    }

    log::debug!(
        "Parsed {} deck sections: {:?}",
        sections.len(),
        sections.iter().map(|s| s.heading.as_str()).collect::<Vec<_>>()
    );

    (sections.len() >= MIN_SECTIONS).then_some(sections)
}

struct Heading<'a> {
    start: usize,
    end: usize,
    number: &'a str,
    title: &'a str,
}

/// Unwrap a raw protocol envelope that was forwarded instead of its
/// `response` text. Never fails: anything unrecognized is returned as-is.
fn normalize(text: &str) -> Cow<'_, str> {
    let mut clean = Cow::Borrowed(text);

    if text.contains(r#""response":"#) && text.contains("module_outputs") {
        if let Some(inner) = ENVELOPE_RESPONSE_RE.captures(text).and_then(|c| c.get(1)) {
            clean = Cow::Owned(unescape(inner.as_str()));
        }
    }

    if clean.starts_with('{') && clean.contains(r#""response":"#) {
        let inner = match serde_json::from_str::<Value>(&clean) {
            Ok(value) => value
                .get("response")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Err(e) => {
                log::debug!("Response is not a JSON envelope ({}), using text as-is", e);
                None
            }
        };
        if let Some(inner) = inner {
            clean = Cow::Owned(inner);
        }
    }

    clean
}

fn unescape(s: &str) -> String {
    s.replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

/// Decide whether the text before the first heading becomes a leading
/// "Executive Snapshot" card.
fn lead_in_snapshot(lead_in: &str) -> Option<DeckSection> {
    let lead_in = lead_in.trim();

    if let Some(marker) = SNAPSHOT_MARKER_RE.find(lead_in) {
        let rest = &lead_in[marker.end()..];
        // Body ends at the next `##` or blank line, or at the end of the
        // lead-in when neither follows. A marker with no terminator still
        // yields a card instead of falling through to the bullet check.
        let cut = [rest.find("##"), rest.find("\n\n")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(rest.len());
        return Some(DeckSection::new(EXECUTIVE_SNAPSHOT, rest[..cut].trim()));
    }

    let structured = lead_in.contains('•') || lead_in.contains('*') || lead_in.contains("AI optimizes");
    if lead_in.chars().count() > MIN_LEAD_IN_CHARS && structured {
        return Some(DeckSection::new(EXECUTIVE_SNAPSHOT, lead_in));
    }

    None
}

fn clean_body(raw: &str) -> String {
    LEADING_HASHES_RE.replace_all(raw.trim(), "").trim().to_string()
}

fn is_noise(body: &str) -> bool {
    body.chars().count() < MIN_BODY_CHARS && !body.contains('|') && !body.contains('•')
}
