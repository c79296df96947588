//! Test helpers: an in-process app driven through `tower::ServiceExt::oneshot`

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use marginalia_auth::{hash_password, Authenticator, Credentials, UsernamePolicy};
use marginalia_core::{LookupError, MarginaliaConfig, UserEntry, UserRecord, UserService};
use std::sync::Arc;
use tower::ServiceExt;

pub const AUTHORITY: &str = "example.org";

pub struct TestUser {
    pub username: &'static str,
    pub password: &'static str,
}

impl TestUser {
    pub fn authorization(&self) -> String {
        Credentials::new(self.username, self.password).to_authorization()
    }
}

pub const BOB: TestUser = TestUser {
    username: "bob",
    password: "bob-password",
};

pub const ADMIN: TestUser = TestUser {
    username: "root_admin",
    password: "s3cret",
};

pub fn test_config() -> MarginaliaConfig {
    let mut config = MarginaliaConfig {
        authority: AUTHORITY.to_string(),
        ..MarginaliaConfig::default()
    };
    config.users.push(UserEntry {
        username: BOB.username.to_string(),
        password_hash: hash_password(BOB.password).unwrap(),
        admin: false,
        staff: false,
        groups: vec!["giraffe".to_string()],
    });
    config.users.push(UserEntry {
        username: ADMIN.username.to_string(),
        password_hash: hash_password(ADMIN.password).unwrap(),
        admin: true,
        staff: true,
        groups: Vec::new(),
    });
    config
}

/// A user store that is down
pub struct UnavailableUsers;

#[async_trait]
impl UserService for UnavailableUsers {
    async fn fetch(&self, _userid: &str) -> Result<Option<UserRecord>, LookupError> {
        Err(LookupError::Unavailable("database is down".to_string()))
    }
}

/// Accepts any credentials, then hands the userid to a store that fails
pub struct TrustingAuthenticator;

#[async_trait]
impl Authenticator for TrustingAuthenticator {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<String>, LookupError> {
        Ok(Some(format!("acct:{}@{}", credentials.username, AUTHORITY)))
    }
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::get(uri);
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn response(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.response(request).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn spawn_app() -> TestApp {
    let state = marginalia_web::AppState::new(test_config()).unwrap();
    TestApp {
        router: marginalia_web::create_app(state),
    }
}

pub fn spawn_app_with_failing_store() -> TestApp {
    let state = marginalia_web::AppState::with_services(
        test_config(),
        Arc::new(UnavailableUsers),
        Arc::new(TrustingAuthenticator),
        UsernamePolicy::default(),
    );
    TestApp {
        router: marginalia_web::create_app(state),
    }
}
