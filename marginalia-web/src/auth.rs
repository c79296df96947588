//! Request authentication extractors
//!
//! `Authorization: Basic` → [`Authenticator`] → [`GroupFinder`]. Bad or
//! missing credentials leave the request anonymous. A failing user store is
//! reported as 503 and never downgraded to anonymous.
//!
//! [`Authenticator`]: marginalia_auth::Authenticator
//! [`GroupFinder`]: marginalia_auth::GroupFinder

use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use marginalia_auth::{role, Credentials, Principal, PrincipalSet, RequestContext};
use marginalia_core::LookupError;
use std::convert::Infallible;
use tracing::{debug, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Basic credentials from the `Authorization` header, if well-formed
#[derive(Debug, Clone)]
pub struct BasicCredentials(pub Option<Credentials>);

impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BasicCredentials(extract_basic_credentials(&parts.headers)))
    }
}

fn extract_basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credentials::from_authorization)
}

/// Request id from `x-request-id`, or a fresh one
pub(crate) fn request_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(RequestContext::with_request_id)
        .unwrap_or_default()
}

/// Who is making the request and what they are granted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPrincipals {
    pub userid: Option<String>,
    pub principals: PrincipalSet,
}

impl RequestPrincipals {
    pub fn anonymous() -> Self {
        Self {
            userid: None,
            principals: [Principal::everyone()].into_iter().collect(),
        }
    }

    /// Everyone, Authenticated and the userid itself, plus the resolved set
    pub fn authenticated(userid: String, resolved: PrincipalSet) -> Self {
        let mut principals = resolved;
        principals.insert(Principal::everyone());
        principals.insert(Principal::authenticated());
        principals.insert(Principal::new(userid.clone()));

        Self {
            userid: Some(userid),
            principals,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.userid.is_some()
    }

    pub fn has(&self, principal: &str) -> bool {
        self.principals.contains(principal)
    }
}

/// The user store failed while authenticating the request
#[derive(Debug)]
pub struct LookupFailed(pub LookupError);

impl From<LookupError> for LookupFailed {
    fn from(error: LookupError) -> Self {
        Self(error)
    }
}

impl IntoResponse for LookupFailed {
    fn into_response(self) -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "user_lookup_failed",
                "message": self.0.to_string(),
                "retryable": self.0.is_transient(),
            })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequestPrincipals
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LookupFailed;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(credentials) = extract_basic_credentials(&parts.headers) else {
            return Ok(Self::anonymous());
        };

        let Some(userid) = app_state.authenticator.authenticate(&credentials).await? else {
            debug!(username = %credentials.username, "Credentials rejected");
            return Ok(Self::anonymous());
        };

        let ctx = request_context(&parts.headers);
        match app_state.group_finder.find(&userid, &ctx).await? {
            Some(resolved) => Ok(Self::authenticated(userid, resolved)),
            None => {
                warn!(%userid, "Authenticated user not found by user service");
                Ok(Self::anonymous())
            }
        }
    }
}

/// Rejections for extractors that require a signed-in user
#[derive(Debug)]
pub enum AuthRejection {
    Unauthenticated,
    Forbidden { required: &'static str },
    LookupFailed(LookupFailed),
}

impl From<LookupFailed> for AuthRejection {
    fn from(error: LookupFailed) -> Self {
        AuthRejection::LookupFailed(error)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"marginalia\"")],
                Json(serde_json::json!({
                    "error": "unauthenticated",
                    "message": "Valid Basic credentials are required",
                })),
            )
                .into_response(),
            AuthRejection::Forbidden { required } => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({
                    "error": "permission_denied",
                    "message": format!("Required principal: {}", required),
                    "required_principal": required,
                })),
            )
                .into_response(),
            AuthRejection::LookupFailed(error) => error.into_response(),
        }
    }
}

/// Signed-in user only
pub struct AuthenticatedUser(pub RequestPrincipals);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principals = RequestPrincipals::from_request_parts(parts, state).await?;

        if principals.is_authenticated() {
            Ok(AuthenticatedUser(principals))
        } else {
            Err(AuthRejection::Unauthenticated)
        }
    }
}

/// Signed-in user holding the admin role
pub struct AdminUser(pub RequestPrincipals);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principals) =
            AuthenticatedUser::from_request_parts(parts, state).await?;

        if principals.has(role::ADMIN) {
            Ok(AdminUser(principals))
        } else {
            warn!(
                userid = ?principals.userid,
                "Admin access required but user is not admin"
            );
            Err(AuthRejection::Forbidden {
                required: role::ADMIN,
            })
        }
    }
}
