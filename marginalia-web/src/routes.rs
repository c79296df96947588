//! Route definitions

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Principals
        .route("/whoami", get(handlers::whoami))
        .route("/principals/translate", post(handlers::translate_principals))
        .route("/users/{userid}/principals", get(handlers::user_principals))
        // Accounts
        .route("/usernames/check", post(handlers::check_username))
}
