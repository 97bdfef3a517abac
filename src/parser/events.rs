//! Converts free-form calendar agent replies into structured events.
//!
//! Agents answer in whatever style their model favors: numbered markdown
//! lists, bulleted label blocks, embedded JSON arrays, or a plain Google
//! Calendar `items` payload. Each recognized pattern is a named rule;
//! new-item rules run before detail rules. Nothing here returns an error,
//! every unmatched shape falls through to the next strategy and finally
//! to an empty list.

use crate::agent::extract_text;
use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

/// Start or end of an event, Google Calendar wire shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

impl EventTime {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.date_time.is_none()
    }
}

/// A calendar event extracted from an agent reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Generated per parse, never taken from the source text
    pub id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "EventTime::is_empty")]
    pub start: EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

lazy_static! {
    /// New item: "1. **Birthday**", "2) Dinner", "a. Standup"
    static ref NUMBERED_ITEM: Regex = Regex::new(r"^(?:\d+|[A-Za-z])[.)]\s+(.*)$").unwrap();
    /// New item: "- **Event Title:** Birthday" / "- Event: Birthday"
    static ref EVENT_LABEL_ITEM: Regex =
        Regex::new(r"(?i)^-\s*(?:\*\*)?\s*event(?:\s*title)?\s*:\s*(?:\*\*)?\s*(.*)$").unwrap();
    /// Detail line: "- **Label:** value"
    static ref DETAIL_LINE: Regex = Regex::new(r"^-\s*\*\*([^:*]+?)\s*:\s*\*\*\s*(.*)$").unwrap();
    /// Emphasized span at the start of a chunk
    static ref BOLD_SPAN: Regex = Regex::new(r"^\*\*(.*?)\*\*").unwrap();
    /// Optional "Event:"/"Title:" prefix inside a title
    static ref TITLE_PREFIX: Regex = Regex::new(r"(?i)^(?:event|title)\s*:\s*").unwrap();
    /// "[View Event](url)" anywhere in a line
    static ref VIEW_LINK: Regex = Regex::new(r"\[View Event\]\(([^)]+)\)").unwrap();
    /// Any markdown link, first URL captured
    static ref MARKDOWN_LINK: Regex = Regex::new(r"\[[^\]]*\]\(([^)]+)\)").unwrap();
}

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a raw agent response into calendar events.
///
/// Fallback chain: markdown line scan, embedded JSON array, raw array,
/// `items` array, empty. Never fails.
pub fn parse_events(raw: &Value) -> Vec<CalendarEvent> {
    let text = extract_text(raw);
    if !text.is_empty() {
        let events = scan_markdown(&text);
        if !events.is_empty() {
            return events;
        }
        return embedded_json_events(&text);
    }

    // No text found: the response may already be event objects
    if let Some(values) = raw.as_array() {
        return events_from_values(values);
    }
    if let Some(values) = raw.get("items").and_then(Value::as_array) {
        return events_from_values(values);
    }
    Vec::new()
}

/// Line scan with a current-event accumulator
fn scan_markdown(text: &str) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let mut current: Option<CalendarEvent> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if let Some(caps) = NUMBERED_ITEM.captures(line) {
            if let Some(event) = current.take() {
                events.push(event);
            }
            current = Some(new_event(item_title(&caps[1])));
            continue;
        }

        if let Some(caps) = EVENT_LABEL_ITEM.captures(line) {
            if let Some(event) = current.take() {
                events.push(event);
            }
            current = Some(new_event(item_title(&caps[1])));
            continue;
        }

        // Lines before the first event are ignored
        let Some(event) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = DETAIL_LINE.captures(line) {
            apply_detail(event, &caps[1], caps[2].trim());
        }

        if event.html_link.is_none() {
            if let Some(caps) = VIEW_LINK.captures(line) {
                event.html_link = Some(caps[1].to_string());
            }
        }
    }

    if let Some(event) = current.take() {
        events.push(event);
    }
    events
}

fn new_event(summary: String) -> CalendarEvent {
    CalendarEvent {
        id: new_event_id(),
        summary,
        ..CalendarEvent::default()
    }
}

fn new_event_id() -> String {
    format!("evt-{}", Uuid::new_v4())
}

/// Title of a list item: emphasized span when present, stripped of
/// emphasis markers and a leading "Event:"/"Title:" prefix
fn item_title(rest: &str) -> String {
    let title = match BOLD_SPAN.captures(rest) {
        Some(caps) => caps[1].to_string(),
        None => rest.trim().trim_matches('*').to_string(),
    };
    TITLE_PREFIX.replace(&title, "").trim().to_string()
}

/// Apply one recognized "- **Label:** value" line to the current event.
/// Labels match case-insensitively, ignoring internal whitespace.
fn apply_detail(event: &mut CalendarEvent, label: &str, value: &str) {
    match normalize_label(label).as_str() {
        "date" | "startdate" => {
            event.start.date = Some(value.to_string());
            event.start.date_time = parse_date(value).and_then(midnight_iso);
        }
        "enddate" => {
            let end = event.end.get_or_insert_with(EventTime::default);
            end.date = Some(value.to_string());
            end.date_time = parse_date(value).and_then(midnight_iso);
        }
        "time" => {
            event.description.push_str(&format!("Time: {}\n", value));
            if let Some(date_str) = event.start.date.clone() {
                if let (Some(date), Some(time)) = (parse_date(&date_str), parse_time(value)) {
                    event.start.date_time = Some(date.and_time(time).format(ISO_FORMAT).to_string());
                }
            }
        }
        "location" => {
            event.location = Some(value.to_string());
            event.description.push_str(&format!("Location: {}\n", value));
        }
        "status" => {
            event.status = Some(value.to_string());
        }
        "linktoevent" | "eventlink" => {
            let url = MARKDOWN_LINK
                .captures(value)
                .map(|caps| caps[1].to_string())
                .unwrap_or_else(|| value.to_string());
            event.html_link = Some(url);
        }
        _ => {}
    }
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Try the date formats agents actually produce
fn parse_date(value: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
        "%m/%d/%Y",
        "%d.%m.%Y",
    ];
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parse a time of day, taking the start of a "9:00 AM - 10:00 AM" range
fn parse_time(value: &str) -> Option<NaiveTime> {
    const FORMATS: &[&str] = &["%I:%M %p", "%I %p", "%H:%M", "%H.%M"];
    let first = value.split(['-', '\u{2013}']).next()?.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(first, fmt).ok())
}

fn midnight_iso(date: NaiveDate) -> Option<String> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.format(ISO_FORMAT).to_string())
}

/// Embedded JSON fallback: the bracketed, brace-containing substring
fn embedded_json_events(text: &str) -> Vec<CalendarEvent> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Vec::new();
    };
    if start >= end {
        return Vec::new();
    }
    let candidate = &text[start..=end];
    if !candidate.contains('{') {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(values) => events_from_values(&values),
        Err(e) => {
            warn!("Failed to parse JSON fallback from agent text: {}", e);
            Vec::new()
        }
    }
}

/// Deserialize event objects, skipping ones that do not fit the shape
fn events_from_values(values: &[Value]) -> Vec<CalendarEvent> {
    values
        .iter()
        .filter_map(|value| serde_json::from_value::<CalendarEvent>(value.clone()).ok())
        .map(|mut event| {
            if event.id.is_empty() {
                event.id = new_event_id();
            }
            event
        })
        .collect()
}
