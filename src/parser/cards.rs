//! Segments recommendation and gift-idea text into display cards.
//!
//! Agent output carries no schema guarantee, so every unmatched shape is
//! preserved as a visible fallback instead of being dropped: a section
//! with no recognizable list style becomes one verbatim text block, a
//! list chunk without the expected title shape becomes a fallback entry.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One "### " section of an agent reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: Option<String>,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionBody {
    Cards(Vec<CardItem>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardItem {
    Card(Card),
    /// Chunk that did not match the expected item shape, kept verbatim
    Fallback(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub badge: Badge,
    pub title: String,
    pub details: Vec<DetailLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    /// Ordinal of a numbered list item
    Number(u32),
    /// Fixed marker for bulleted items
    Check,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailLine {
    KeyValue { key: String, value: String },
    Text(String),
}

lazy_static! {
    /// "### Header" at the start of a line
    static ref SECTION_MARKER: Regex = Regex::new(r"(?m)^### ").unwrap();
    /// Start of a numbered list item: "1. " / "12) "
    static ref NUMBERED_START: Regex = Regex::new(r"(?m)^\d+[.)]\s").unwrap();
    /// Start of a bulleted card: "- **"
    static ref BULLET_START: Regex = Regex::new(r"(?m)^-\s+\*\*").unwrap();
    /// Full numbered item: ordinal + content (content may span lines)
    static ref NUMBERED_ITEM: Regex = Regex::new(r"(?s)^(\d+)[.)]\s+(.*)$").unwrap();
    /// Full bulleted item: "- **Title**" + remainder
    static ref BULLET_ITEM: Regex = Regex::new(r"(?s)^-\s*\*\*(.*?)\*\*(.*)$").unwrap();
    /// Detail line: "- **Key:** value"
    static ref KEY_VALUE_LINE: Regex = Regex::new(r"^-\s*\*\*(.*?)\s*:\s*\*\*\s*(.*)$").unwrap();
    /// Leading "- " of a plain detail line
    static ref BULLET_PREFIX: Regex = Regex::new(r"^-\s*").unwrap();
}

/// Render already-extracted agent text into sections of cards.
///
/// Pure over its input; empty text yields an empty sequence.
pub fn render_cards(text: &str) -> Vec<Section> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    split_at(text, &SECTION_MARKER)
        .into_iter()
        .filter_map(parse_section)
        .collect()
}

/// Split text at every match start of a line-anchored marker, keeping
/// the marker with the chunk that follows it
fn split_at<'a>(text: &'a str, marker: &Regex) -> Vec<&'a str> {
    let starts: Vec<usize> = marker.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![text];
    }

    let mut chunks = Vec::new();
    if starts[0] > 0 {
        chunks.push(&text[..starts[0]]);
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        chunks.push(&text[start..end]);
    }
    chunks
}

fn parse_section(chunk: &str) -> Option<Section> {
    let (header, body) = match chunk.strip_prefix("### ") {
        Some(rest) => {
            let (header_line, body) = rest.split_once('\n').unwrap_or((rest, ""));
            (Some(header_line.trim().to_string()), body)
        }
        None => (None, chunk),
    };

    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    Some(Section {
        header,
        body: parse_section_body(body),
    })
}

/// Detect the list style of a section body: numbered first, then
/// bulleted, else one verbatim text block
fn parse_section_body(body: &str) -> SectionBody {
    let numbered: Vec<&str> = split_at(body, &NUMBERED_START)
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect();
    if numbered.iter().any(|chunk| NUMBERED_START.is_match(chunk)) {
        return SectionBody::Cards(numbered.into_iter().map(numbered_item).collect());
    }

    let bulleted: Vec<&str> = split_at(body, &BULLET_START)
        .into_iter()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect();
    if bulleted.iter().any(|chunk| BULLET_START.is_match(chunk)) {
        return SectionBody::Cards(bulleted.into_iter().map(bulleted_item).collect());
    }

    SectionBody::Text(body.to_string())
}

/// "1. **Title**\n- **Key:** value ..." into a card; chunks that fail
/// the ordinal shape are preserved verbatim
fn numbered_item(chunk: &str) -> CardItem {
    let Some(caps) = NUMBERED_ITEM.captures(chunk) else {
        return CardItem::Fallback(chunk.to_string());
    };
    let ordinal: u32 = match caps[1].parse() {
        Ok(n) => n,
        Err(_) => return CardItem::Fallback(chunk.to_string()),
    };
    let content = caps[2].trim();

    let (title, details_src) = match leading_bold_span(content) {
        Some((title, rest)) => (title, rest),
        // No emphasized span: keep the whole remainder visible as details
        None => (format!("Item {}", ordinal), content.to_string()),
    };

    CardItem::Card(Card {
        badge: Badge::Number(ordinal),
        title,
        details: detail_lines(&details_src),
    })
}

/// "- **Title** ..." into a card; chunks without an emphasized leading
/// span are preserved verbatim
fn bulleted_item(chunk: &str) -> CardItem {
    let Some(caps) = BULLET_ITEM.captures(chunk) else {
        return CardItem::Fallback(chunk.to_string());
    };

    CardItem::Card(Card {
        badge: Badge::Check,
        title: caps[1].trim().to_string(),
        details: detail_lines(caps[2].trim()),
    })
}

/// Emphasized span at the start of a chunk, with the remainder
fn leading_bold_span(content: &str) -> Option<(String, String)> {
    let rest = content.strip_prefix("**")?;
    let (title, remainder) = rest.split_once("**")?;
    Some((title.trim().to_string(), remainder.trim().to_string()))
}

/// Detail lines: "- **Key:** value" pairs, other non-empty lines kept as
/// plain text with a leading "- " stripped
fn detail_lines(src: &str) -> Vec<DetailLine> {
    src.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(caps) = KEY_VALUE_LINE.captures(line) {
                DetailLine::KeyValue {
                    key: caps[1].trim().to_string(),
                    value: caps[2].trim().to_string(),
                }
            } else {
                DetailLine::Text(BULLET_PREFIX.replace(line, "").to_string())
            }
        })
        .collect()
}
