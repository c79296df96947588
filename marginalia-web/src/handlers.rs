//! HTTP request handlers

use crate::auth::{request_context, AdminUser, LookupFailed, RequestPrincipals};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use marginalia_auth::{translate_annotation_principals, UsernameError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: String,
}

/// Principals of the current request
#[derive(Debug, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub userid: Option<String>,
    pub authenticated: bool,
    pub principals: Vec<String>,
}

impl From<RequestPrincipals> for WhoAmIResponse {
    fn from(request: RequestPrincipals) -> Self {
        Self {
            authenticated: request.is_authenticated(),
            userid: request.userid,
            principals: request
                .principals
                .into_iter()
                .map(|p| p.into_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsernameCheckRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsernameCheckResponse {
    pub username: String,
    pub available: bool,
    pub reason: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Report the caller's principals
pub async fn whoami(principals: RequestPrincipals) -> Json<WhoAmIResponse> {
    Json(principals.into())
}

/// Normalise principals read from annotation storage
pub async fn translate_principals(Json(principals): Json<Vec<String>>) -> Json<Vec<String>> {
    let translated = translate_annotation_principals(&principals);
    debug!(
        input = principals.len(),
        output = translated.len(),
        "Translated annotation principals"
    );

    Json(translated.into_iter().map(|p| p.into_string()).collect())
}

/// Check whether a username could be registered
pub async fn check_username(
    State(state): State<AppState>,
    Json(request): Json<UsernameCheckRequest>,
) -> Response {
    let result = state
        .username_policy
        .check_available(
            &request.username,
            &state.config.authority,
            state.user_service.as_ref(),
        )
        .await;

    let (status, reason) = match result {
        Ok(()) => (StatusCode::OK, None),
        Err(UsernameError::Lookup(e)) => {
            error!(username = %request.username, error = %e, "Username check failed");
            return LookupFailed(e).into_response();
        }
        Err(e @ UsernameError::Taken) => (StatusCode::CONFLICT, Some(e.to_string())),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, Some(e.to_string())),
    };

    (
        status,
        Json(UsernameCheckResponse {
            available: reason.is_none(),
            username: request.username,
            reason,
        }),
    )
        .into_response()
}

/// Resolve the principals of any account (admin only)
pub async fn user_principals(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(userid): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, Response> {
    let ctx = request_context(&headers);

    match state.group_finder.find(&userid, &ctx).await {
        Ok(Some(principals)) => Ok(Json(
            principals.into_iter().map(|p| p.into_string()).collect(),
        )),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "not_found",
                "message": format!("No such user: {}", userid),
            })),
        )
            .into_response()),
        Err(e) => Err(LookupFailed(e).into_response()),
    }
}
