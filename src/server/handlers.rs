use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use super::auth::login_succeeded;
use super::userdb::NewUser;
use super::AppState;
use crate::agent::rpc::TaskSendRequest;
use crate::agent::{extract_text, json_payload, prompts, AgentKind};
use crate::parser::{parse_events, render_cards};
use crate::session::Session;

/// Handler for the root liveness check
pub async fn index_handler() -> impl IntoResponse {
    "Concierge backend is running"
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Create a user in the external directory
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Response {
    if body.name.is_empty() || body.email.is_empty() || body.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Name, email, and password are required" })),
        )
            .into_response();
    }

    let user = NewUser {
        full_name: body.name,
        email: body.email,
        phone: body.phone,
        password: body.password,
    };

    match state.directory.create_user(&user).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(json!({ "message": "User created successfully", "user": created })),
        )
            .into_response(),
        Err(e) if e.is_duplicate() => {
            info!("Signup for an existing user, reporting conflict");
            (
                StatusCode::CONFLICT,
                Json(json!({ "message": "User already exists", "details": e.message })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Signup error: {}", e);
            match e.status.and_then(|s| StatusCode::from_u16(s).ok()) {
                Some(status) => (
                    status,
                    Json(json!({ "message": "Failed to create user", "details": e.message })),
                )
                    .into_response(),
                None => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Signup failed", "details": e.message })),
                )
                    .into_response(),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Verify credentials and assemble the user + preferences reply
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    if body.username.is_empty() || body.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Username and password are required" })),
        )
            .into_response();
    }

    let reply = match state.login.verify(&body.username, &body.password).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Login error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Login failed", "details": e.to_string() })),
            )
                .into_response();
        }
    };

    if !login_succeeded(&reply) {
        let message = reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Login failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": message })),
        )
            .into_response();
    }

    match state.directory.fetch_profiles(&body.username).await {
        Ok(profiles) if !profiles.is_empty() => {
            let (user_fields, family_members) = split_family_members(&profiles[0]);
            let user = json!({
                "name": user_fields.get("full_name").or_else(|| user_fields.get("name")),
                "email": user_fields.get("email"),
                "phone": user_fields.get("phone"),
            });
            let preferences = json!({
                "user_profiles": user_fields,
                "family_members": family_members,
            });

            save_session(&state, user.clone(), Some(preferences.clone())).await;

            Json(json!({
                "message": "Login successful",
                "user": user,
                "preferences": preferences,
            }))
            .into_response()
        }
        Ok(_) => {
            // Login succeeded but no profile exists yet
            let user = json!({ "email": body.username });
            save_session(&state, user.clone(), None).await;
            Json(json!({
                "message": "Login successful",
                "user": user,
                "preferences": Value::Null,
            }))
            .into_response()
        }
        Err(e) => {
            error!("Profile fetch error: {}", e);
            let user = json!({ "email": body.username });
            save_session(&state, user.clone(), None).await;
            Json(json!({
                "message": "Login successful",
                "user": user,
                "preferences": Value::Null,
                "warning": "Could not fetch user profile",
            }))
            .into_response()
        }
    }
}

/// Split `family_members` out of a profile record
fn split_family_members(profile: &Value) -> (Map<String, Value>, Value) {
    let mut fields = profile.as_object().cloned().unwrap_or_default();
    let family = fields
        .remove("family_members")
        .unwrap_or_else(|| json!([]));
    (fields, family)
}

async fn save_session(state: &AppState, user: Value, preferences: Option<Value>) {
    if let Err(e) = state.sessions.save(Session { user, preferences }).await {
        warn!("Failed to persist session: {}", e);
    }
}

/// Current persisted session, `null` when logged out
pub async fn session_handler(State(state): State<AppState>) -> Response {
    match state.sessions.get().await {
        Some(session) => Json(json!({
            "user": session.user,
            "preferences": session.preferences,
        }))
        .into_response(),
        None => Json(Value::Null).into_response(),
    }
}

/// Clear the persisted session
pub async fn logout_handler(State(state): State<AppState>) -> Response {
    match state.sessions.clear().await {
        Ok(()) => Json(json!({ "message": "Logged out" })).into_response(),
        Err(e) => {
            error!("Logout error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to clear session" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PublicDataRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Fetch public data about the user from the public data agent
pub async fn public_data_handler(
    State(state): State<AppState>,
    Json(body): Json<PublicDataRequest>,
) -> Response {
    let email = body.email.as_deref().unwrap_or("");
    let name = body.name.as_deref().unwrap_or("");
    if email.is_empty() || name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email and Name are required" })),
        )
            .into_response();
    }

    let prompt = prompts::public_data(name, body.phone.as_deref());
    match state.gateway.send_task(AgentKind::PublicData, &prompt).await {
        Ok(raw) => match json_payload(&raw) {
            Some(data) => Json(data).into_response(),
            None => {
                warn!("Failed to parse JSON from public data agent response");
                Json(raw).into_response()
            }
        },
        Err(e) => {
            error!("Error fetching public data: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch public data", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Forward a preference record to the preference create agent.
/// A conflict reported by the agent is a soft success for the user flow.
pub async fn preferences_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Response {
    let payload = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    let prompt = prompts::preference_create(&payload);

    match state
        .gateway
        .send_task(AgentKind::PreferenceCreate, &prompt)
        .await
    {
        Ok(raw) => {
            let text = extract_text(&raw);
            if has_conflict_marker(&text) {
                info!("Preference record already exists, proceeding as success");
                return Json(json!({
                    "status": "success",
                    "message": "Preferences already saved.",
                }))
                .into_response();
            }
            if has_error_marker(&text) {
                error!("Preference agent reported an error: {}", text);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to save preferences", "details": text })),
                )
                    .into_response();
            }
            Json(raw).into_response()
        }
        Err(e) => {
            let message = e.to_string();
            if has_conflict_marker(&message) {
                info!("Preference record already exists, proceeding as success");
                return Json(json!({
                    "status": "success",
                    "message": "Preferences already saved.",
                }))
                .into_response();
            }
            error!("Error saving preferences: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to save preferences", "details": message })),
            )
                .into_response()
        }
    }
}

fn has_conflict_marker(text: &str) -> bool {
    !text.is_empty() && (text.to_lowercase().contains("conflict") || text.contains("409"))
}

fn has_error_marker(text: &str) -> bool {
    !text.is_empty() && (text.to_lowercase().contains("error") || text.contains("500"))
}

/// Forward a calendar query and return the upstream body unmodified
pub async fn calendar_events_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let rpc_body = incoming_rpc_body(&state, &body).await;
    match state.gateway.forward(AgentKind::Calendar, &rpc_body).await {
        Ok(raw) => Json(raw).into_response(),
        Err(e) => calendar_error(e),
    }
}

/// Forward a calendar query and reply with the parsed event list
pub async fn calendar_events_parsed_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let rpc_body = incoming_rpc_body(&state, &body).await;
    match state.gateway.forward(AgentKind::Calendar, &rpc_body).await {
        Ok(raw) => Json(parse_events(&raw)).into_response(),
        Err(e) => calendar_error(e),
    }
}

fn calendar_error(e: crate::error::Error) -> Response {
    error!("Error fetching calendar events: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to fetch calendar events", "details": e.to_string() })),
    )
        .into_response()
}

/// The caller's JSON-RPC envelope when one was posted, else a default
/// envelope built from the session's email
async fn incoming_rpc_body(state: &AppState, body: &[u8]) -> Value {
    if !body.is_empty() {
        if let Ok(value) = serde_json::from_slice::<Value>(body) {
            if !value.is_null() {
                return value;
            }
        }
    }

    let email = state
        .sessions
        .get()
        .await
        .and_then(|session| {
            session
                .user
                .get("email")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default();
    serde_json::to_value(TaskSendRequest::new(&prompts::calendar_events(&email)))
        .unwrap_or(Value::Null)
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub event_summary: Option<String>,
    #[serde(default)]
    pub event_location: Option<String>,
}

/// Query the preference agent for venue and strategy suggestions
pub async fn recommendations_query_handler(
    State(state): State<AppState>,
    Json(body): Json<RecommendationQuery>,
) -> Response {
    let phone = body.phone.as_deref().unwrap_or("9876543210");
    let summary = body.event_summary.as_deref().unwrap_or("celebration");
    let location = body.event_location.as_deref().unwrap_or("Hyderabad");

    let prompt = prompts::preference_query(phone, summary, location);
    match state
        .gateway
        .send_task(AgentKind::PreferenceQuery, &prompt)
        .await
    {
        Ok(raw) => Json(raw).into_response(),
        Err(e) => {
            error!("Error getting recommendations: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to get recommendations", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Render an agent reply (or a bare `{ "text": ... }`) into card sections
pub async fn recommendation_cards_handler(Json(body): Json<Value>) -> Response {
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| extract_text(&body));
    Json(render_cards(&text)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct GiftRequest {
    #[serde(default)]
    pub events: Value,
    #[serde(default)]
    pub preferences: Value,
}

/// Ask the gift agent for ideas tied to the selected events
pub async fn gift_ideas_handler(
    State(state): State<AppState>,
    Json(body): Json<GiftRequest>,
) -> Response {
    let profile = body
        .preferences
        .get("user_profiles")
        .cloned()
        .unwrap_or_else(|| json!({}));
    let family = body
        .preferences
        .get("family_members")
        .cloned()
        .unwrap_or_else(|| json!([]));

    let prompt = prompts::gift_recommend(&body.events, &profile, &family);
    match state
        .gateway
        .send_task(AgentKind::GiftRecommend, &prompt)
        .await
    {
        Ok(raw) => match json_payload(&raw) {
            Some(data) => Json(data).into_response(),
            None => {
                warn!("Failed to parse JSON from gift recommendation agent response");
                Json(raw).into_response()
            }
        },
        Err(e) => {
            error!("Error getting gift ideas: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to get gift ideas", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}
