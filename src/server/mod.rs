pub mod auth;
pub mod handlers;
pub mod userdb;

use crate::agent::AgentGateway;
use crate::session::SessionStore;
use auth::LoginService;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use userdb::UserDirectory;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AgentGateway>,
    pub login: Arc<dyn LoginService>,
    pub directory: Arc<dyn UserDirectory>,
    pub sessions: Arc<SessionStore>,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/signup", post(handlers::signup_handler))
        .route("/login", post(handlers::login_handler))
        .route("/logout", post(handlers::logout_handler))
        .route("/session", get(handlers::session_handler))
        .route("/public-data", post(handlers::public_data_handler))
        .route("/preferences", post(handlers::preferences_handler))
        .route("/calendar/events", post(handlers::calendar_events_handler))
        .route(
            "/calendar/events/parsed",
            post(handlers::calendar_events_parsed_handler),
        )
        .route(
            "/recommendations/query",
            post(handlers::recommendations_query_handler),
        )
        .route(
            "/recommendations/cards",
            post(handlers::recommendation_cards_handler),
        )
        .route("/recommendations/gifts", post(handlers::gift_ideas_handler));

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/health", get(handlers::health_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
