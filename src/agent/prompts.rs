//! Prompt templates for the external agents.
//!
//! Each template uses `{placeholder}` substitution. The query and gift
//! prompts pin the markdown layout the card parser recognizes.

use serde_json::Value;

const PUBLIC_DATA_PROMPT: &str = "Look up publicly available information about the person named {name} (phone: {phone}).
Build a profile record for them and the family members you can find.
Respond with only a JSON object of the form
{\"user_profiles\": {\"full_name\": ..., \"email\": ..., \"phone\": ..., ...}, \"family_members\": [{...}]}
inside a ```json code block. Do not include any text outside the JSON.";

const PREFERENCE_CREATE_PROMPT: &str = "Store the following user preference record in the preference database.
If a record for the same user already exists, report the conflict instead of overwriting it.

{payload}

Reply with a short confirmation message.";

const PREFERENCE_QUERY_PROMPT: &str = "The user with phone {phone} has an upcoming event: \"{summary}\" in {location}.
Using their stored preferences, suggest suitable venues and a strategy for the event.
Format the answer as markdown: group suggestions under '### ' headers, list each suggestion as
a numbered item like '1. **Name**' followed by '- **Key:** value' detail lines.";

const GIFT_RECOMMEND_PROMPT: &str = "Suggest gift ideas and preparation actions for the following calendar events.

Events:
{events}

User profile:
{profile}

Family members:
{family}

Format the answer as markdown: group ideas under '### ' headers, list each idea as a numbered
item like '1. **Gift name**' followed by '- **Key:** value' detail lines such as price range,
where to buy and why it fits.";

/// Prompt for the public data agent
pub fn public_data(name: &str, phone: Option<&str>) -> String {
    PUBLIC_DATA_PROMPT
        .replace("{name}", name)
        .replace("{phone}", phone.unwrap_or("unknown"))
}

/// Prompt for the preference create agent
pub fn preference_create(payload_json: &str) -> String {
    PREFERENCE_CREATE_PROMPT.replace("{payload}", payload_json)
}

/// Prompt for the preference query agent
pub fn preference_query(phone: &str, summary: &str, location: &str) -> String {
    PREFERENCE_QUERY_PROMPT
        .replace("{phone}", phone)
        .replace("{summary}", summary)
        .replace("{location}", location)
}

/// Prompt for the gift recommendation agent
pub fn gift_recommend(events: &Value, profile: &Value, family: &Value) -> String {
    GIFT_RECOMMEND_PROMPT
        .replace(
            "{events}",
            &serde_json::to_string_pretty(events).unwrap_or_else(|_| String::from("[]")),
        )
        .replace(
            "{profile}",
            &serde_json::to_string_pretty(profile).unwrap_or_else(|_| String::from("{}")),
        )
        .replace(
            "{family}",
            &serde_json::to_string_pretty(family).unwrap_or_else(|_| String::from("[]")),
        )
}

/// Default prompt for a calendar fetch when the caller sends no envelope
pub fn calendar_events(email: &str) -> String {
    if email.is_empty() {
        String::from("get all my calendar events?")
    } else {
        format!("get all my calendar events {}?", email)
    }
}
