use concierge::agent::{extract_text, json_payload};
use concierge::parser::{
    parse_events, render_cards, Badge, CardItem, DetailLine, SectionBody,
};
use serde_json::{json, Value};

/// Wrap text in the status-message envelope shape agents usually return
fn agent_reply(text: &str) -> Value {
    json!({
        "result": {
            "status": {
                "message": { "parts": [ { "text": text } ] }
            }
        }
    })
}

#[test]
fn extracts_text_from_status_message_shape() {
    assert_eq!(extract_text(&agent_reply("hello")), "hello");
}

#[test]
fn extracts_text_from_artifact_shape() {
    let raw = json!({
        "result": { "artifacts": [ { "parts": [ { "text": "from artifact" } ] } ] }
    });
    assert_eq!(extract_text(&raw), "from artifact");
}

#[test]
fn extracts_bare_string() {
    assert_eq!(extract_text(&json!("plain")), "plain");
}

#[test]
fn unrecognized_shape_yields_empty_text_and_no_events() {
    let raw = json!({ "unexpected": { "deeply": [ "nested" ] } });
    assert_eq!(extract_text(&raw), "");
    assert!(parse_events(&raw).is_empty());
}

#[test]
fn parses_numbered_event_blocks_in_order() {
    let text = "Here are your events:\n\
        1. **Birthday**\n\
        - **Date:** 2025-12-08\n\
        2. **Team Lunch**\n\
        - **Location:** Cafe\n\
        3. **Dentist**\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].summary, "Birthday");
    assert_eq!(events[1].summary, "Team Lunch");
    assert_eq!(events[2].summary, "Dentist");

    // Every event gets its own generated id
    assert!(events[0].id.starts_with("evt-"));
    assert_ne!(events[0].id, events[1].id);
    assert_ne!(events[1].id, events[2].id);
}

#[test]
fn unparsable_date_stays_a_plain_string() {
    let text = "1. **Reunion**\n- **Date:** TBD\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start.date.as_deref(), Some("TBD"));
    assert!(events[0].start.date_time.is_none());
}

#[test]
fn date_and_time_combine_into_date_time() {
    let text = "1. **Standup**\n- **Date:** 2025-12-10\n- **Time:** 10:00 AM\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start.date.as_deref(), Some("2025-12-10"));
    assert_eq!(
        events[0].start.date_time.as_deref(),
        Some("2025-12-10T10:00:00")
    );
    assert!(events[0].description.contains("Time: 10:00 AM"));
}

#[test]
fn long_form_date_parses_to_midnight() {
    let text = "1. **Birthday**\n- **Date:** December 8, 2025\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(
        events[0].start.date_time.as_deref(),
        Some("2025-12-08T00:00:00")
    );
}

#[test]
fn title_and_location_round_trip() {
    let text = "1. **Team Lunch**\n- **Location:** Cafe\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Team Lunch");
    assert_eq!(events[0].location.as_deref(), Some("Cafe"));
    assert!(events[0].description.contains("Location: Cafe"));
}

#[test]
fn event_label_and_detail_labels_are_recognized() {
    let text = "- **Event Title:** Anniversary Dinner\n\
        - **Start Date:** 2025-11-01\n\
        - **End Date:** 2025-11-02\n\
        - **Status:** confirmed\n\
        - **Link to Event:** [Open](https://example.com/evt/1)\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.summary, "Anniversary Dinner");
    assert_eq!(event.start.date.as_deref(), Some("2025-11-01"));
    let end = event.end.as_ref().expect("end date set");
    assert_eq!(end.date.as_deref(), Some("2025-11-02"));
    assert_eq!(event.status.as_deref(), Some("confirmed"));
    assert_eq!(event.html_link.as_deref(), Some("https://example.com/evt/1"));
}

#[test]
fn title_prefix_and_lettered_markers_are_stripped() {
    let text = "a. **Event: Graduation**\nb) Title: Movie Night\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].summary, "Graduation");
    assert_eq!(events[1].summary, "Movie Night");
}

#[test]
fn view_event_link_sets_html_link_once() {
    let text = "1. **Concert**\n\
        - [View Event](https://example.com/a)\n\
        - [View Event](https://example.com/b)\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events[0].html_link.as_deref(), Some("https://example.com/a"));
}

#[test]
fn lines_before_the_first_event_are_ignored() {
    let text = "- **Date:** 2025-01-01\nSome chatter.\n1. **Real Event**\n";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Real Event");
    assert!(events[0].start.date.is_none());
}

#[test]
fn embedded_json_array_is_the_fallback() {
    let text = "No markdown here, but the raw data is:\n\
        [{\"summary\": \"Yoga\", \"start\": {\"date\": \"2025-03-01\"}}]";
    let events = parse_events(&agent_reply(text));

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Yoga");
    assert_eq!(events[0].start.date.as_deref(), Some("2025-03-01"));
    assert!(events[0].id.starts_with("evt-"));
}

#[test]
fn broken_embedded_json_yields_empty() {
    let text = "events: [{\"summary\": \"Yoga\",]";
    assert!(parse_events(&agent_reply(text)).is_empty());
}

#[test]
fn raw_array_and_items_fallbacks() {
    let raw = json!([
        { "id": "abc", "summary": "Existing", "start": { "dateTime": "2025-12-12T12:30:00" } }
    ]);
    let events = parse_events(&raw);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "abc");
    assert_eq!(events[0].summary, "Existing");

    let raw = json!({ "items": [ { "summary": "From items" } ] });
    let events = parse_events(&raw);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "From items");
}

#[test]
fn reparsing_is_identical_except_for_ids() {
    let text = "1. **Birthday**\n- **Date:** 2025-12-08\n- **Time:** 6:00 PM\n\
        2. **Team Lunch**\n- **Location:** Cafe\n";
    let reply = agent_reply(text);

    let mut first = parse_events(&reply);
    let mut second = parse_events(&reply);
    assert_ne!(first[0].id, second[0].id);

    for event in first.iter_mut().chain(second.iter_mut()) {
        event.id = String::new();
    }
    assert_eq!(first, second);
}

#[test]
fn empty_inputs_yield_empty_results() {
    assert!(parse_events(&json!("")).is_empty());
    assert!(parse_events(&Value::Null).is_empty());
    assert!(render_cards("").is_empty());
    assert!(render_cards("   \n  ").is_empty());
}

#[test]
fn numbered_section_renders_three_cards_and_keeps_misfits() {
    let text = "### Strategy\n\
        1. **Book Early**\n\
        - **Why:** Venues fill up\n\
        2. **Go Local**\n\
        just a stray line\n\
        3. **Keep It Small**\n";
    let sections = render_cards(text);

    assert_eq!(sections.len(), 1);
    let section = &sections[0];
    assert_eq!(section.header.as_deref(), Some("Strategy"));

    let SectionBody::Cards(items) = &section.body else {
        panic!("expected cards");
    };
    assert_eq!(items.len(), 3);

    let CardItem::Card(first) = &items[0] else {
        panic!("expected a card");
    };
    assert_eq!(first.badge, Badge::Number(1));
    assert_eq!(first.title, "Book Early");
    assert_eq!(
        first.details[0],
        DetailLine::KeyValue {
            key: String::from("Why"),
            value: String::from("Venues fill up"),
        }
    );

    // The stray line stays attached to item 2 as plain detail text
    let CardItem::Card(second) = &items[1] else {
        panic!("expected a card");
    };
    assert_eq!(second.details, vec![DetailLine::Text(String::from("just a stray line"))]);
}

#[test]
fn preamble_before_numbered_items_is_a_fallback_entry() {
    let text = "Something first.\n1. **Only Card**\n";
    let sections = render_cards(text);

    let SectionBody::Cards(items) = &sections[0].body else {
        panic!("expected cards");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], CardItem::Fallback(String::from("Something first.")));
    assert!(matches!(items[1], CardItem::Card(_)));
}

#[test]
fn numbered_item_without_emphasis_gets_a_default_title() {
    let text = "1. Just a plain suggestion\n2. **Named**\n";
    let sections = render_cards(text);

    let SectionBody::Cards(items) = &sections[0].body else {
        panic!("expected cards");
    };
    let CardItem::Card(first) = &items[0] else {
        panic!("expected a card");
    };
    assert_eq!(first.title, "Item 1");
    assert_eq!(
        first.details,
        vec![DetailLine::Text(String::from("Just a plain suggestion"))]
    );
}

#[test]
fn bulleted_sections_use_the_check_badge() {
    let text = "### Gift Ideas\n- **Chess Set** A classic.\n   - **Price:** $40\n- **Sketchbook**\n";
    let sections = render_cards(text);

    let SectionBody::Cards(items) = &sections[0].body else {
        panic!("expected cards");
    };
    let CardItem::Card(first) = &items[0] else {
        panic!("expected a card");
    };
    assert_eq!(first.badge, Badge::Check);
    assert_eq!(first.title, "Chess Set");
    assert_eq!(
        first.details,
        vec![
            DetailLine::Text(String::from("A classic.")),
            DetailLine::KeyValue {
                key: String::from("Price"),
                value: String::from("$40"),
            },
        ]
    );

    let CardItem::Card(second) = &items[1] else {
        panic!("expected a card");
    };
    assert_eq!(second.badge, Badge::Check);
    assert_eq!(second.title, "Sketchbook");
    assert!(second.details.is_empty());
}

#[test]
fn section_without_list_style_is_verbatim_text() {
    let text = "### Notes\nNothing structured here,\njust prose.";
    let sections = render_cards(text);

    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].header.as_deref(), Some("Notes"));
    assert_eq!(
        sections[0].body,
        SectionBody::Text(String::from("Nothing structured here,\njust prose."))
    );
}

#[test]
fn multiple_sections_split_at_headers() {
    let text = "Intro line.\n### One\n1. **A**\n### Two\n- **B** details\n";
    let sections = render_cards(text);

    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].header, None);
    assert_eq!(sections[1].header.as_deref(), Some("One"));
    assert_eq!(sections[2].header.as_deref(), Some("Two"));
}

#[test]
fn json_payload_strips_code_fences() {
    let reply = agent_reply("```json\n{\"user_profiles\": {\"full_name\": \"Jane\"}}\n```");
    let payload = json_payload(&reply).expect("payload parses");
    assert_eq!(
        payload["user_profiles"]["full_name"],
        json!("Jane")
    );

    let reply = agent_reply("I could not find anything useful.");
    assert!(json_payload(&reply).is_none());
}
