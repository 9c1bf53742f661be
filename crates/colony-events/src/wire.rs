//! Console wire format: `[EVENT:TYPE]` and `[EVENT:TYPE:VALUE]`.
//!
//! The tag is the upper-case [`EventType::tag`]. The value runs to the
//! closing bracket and may itself contain colons (`harvester:harvester120`).

use colony_types::EventType;

const PREFIX: &str = "[EVENT:";

/// One event recovered from a console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEvent {
    /// The event type named by the tag.
    pub event_type: EventType,
    /// The optional value after the tag.
    pub value: Option<String>,
}

/// Render an event as a console line.
pub fn format_console_line(event: EventType, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{PREFIX}{}:{value}]", event.tag()),
        None => format!("{PREFIX}{}]", event.tag()),
    }
}

/// Find the first well-formed event marker in `line`.
///
/// Markers may be embedded in other text. Malformed markers and unknown
/// tags are skipped.
pub fn parse_console_line(line: &str) -> Option<ConsoleEvent> {
    line.match_indices(PREFIX)
        .find_map(|(start, _)| line.get(start..)?.strip_prefix(PREFIX).and_then(parse_marker))
}

fn parse_marker(rest: &str) -> Option<ConsoleEvent> {
    let body = rest.get(..rest.find(']')?)?;
    let (tag, value) = match body.split_once(':') {
        Some((tag, value)) => (tag, Some(value)),
        None => (body, None),
    };
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_uppercase() || b == b'_') {
        return None;
    }
    if value.is_some_and(str::is_empty) {
        return None;
    }
    Some(ConsoleEvent {
        event_type: EventType::from_tag(tag)?,
        value: value.map(str::to_owned),
    })
}
