use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// A single probe for one known response-envelope shape
type TextProbe = fn(&Value) -> Option<String>;

/// Known envelope shapes, tried in order; first hit wins
const TEXT_PROBES: &[(&str, TextProbe)] = &[
    ("status-message", status_message_text),
    ("artifact", artifact_text),
    ("bare-string", bare_string_text),
];

/// Extract the natural-language text from a raw agent response.
///
/// Returns an empty string when no known shape matches; a missing key at
/// any depth is "not found", never an error.
pub fn extract_text(raw: &Value) -> String {
    for (_name, probe) in TEXT_PROBES {
        if let Some(text) = probe(raw) {
            return text;
        }
    }
    String::new()
}

/// `result.status.message.parts[0].text`
fn status_message_text(raw: &Value) -> Option<String> {
    raw.get("result")?
        .get("status")?
        .get("message")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// `result.artifacts[0].parts[0].text`
fn artifact_text(raw: &Value) -> Option<String> {
    raw.get("result")?
        .get("artifacts")?
        .get(0)?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

fn bare_string_text(raw: &Value) -> Option<String> {
    raw.as_str().map(|s| s.to_string())
}

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"```json\s*([\s\S]*?)\s*```").unwrap();
    static ref CODE_FENCE: Regex = Regex::new(r"```\s*([\s\S]*?)\s*```").unwrap();
}

/// Extract and parse a JSON payload from an agent response.
///
/// Handles markdown code fences around the payload as well as raw JSON
/// text. Returns `None` when no text is found or the content does not
/// parse.
pub fn json_payload(raw: &Value) -> Option<Value> {
    let text = extract_text(raw);
    if text.is_empty() {
        return None;
    }

    let fenced = JSON_FENCE
        .captures(&text)
        .or_else(|| CODE_FENCE.captures(&text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string());
    let candidate = fenced.unwrap_or(text);

    match serde_json::from_str::<Value>(&candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse JSON payload from agent response: {}", e);
            None
        }
    }
}
