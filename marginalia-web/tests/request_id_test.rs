//! The `x-request-id` header reaches every principal lookup of a request

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use helpers::{spawn_app, ADMIN};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Collects the `request_id` of every `groupfinder` span
#[derive(Clone, Default)]
struct LookupSpans(Arc<Mutex<Vec<String>>>);

impl LookupSpans {
    fn request_ids(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct RequestIdVisitor(Option<String>);

impl Visit for RequestIdVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "request_id" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LookupSpans {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() != "groupfinder" {
            return;
        }
        let mut visitor = RequestIdVisitor(None);
        attrs.record(&mut visitor);
        if let Some(request_id) = visitor.0 {
            self.0.lock().unwrap().push(request_id);
        }
    }
}

#[tokio::test]
async fn test_admin_lookup_uses_request_id_header() {
    let spans = LookupSpans::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(spans.clone()));

    let app = spawn_app();
    let request = Request::get("/api/users/acct:bob@example.org/principals")
        .header(header::AUTHORIZATION, ADMIN.authorization())
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    // One lookup authenticates the admin, the other resolves bob
    assert_eq!(spans.request_ids(), vec!["req-42", "req-42"]);
}

#[tokio::test]
async fn test_missing_header_gets_generated_request_id() {
    let spans = LookupSpans::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(spans.clone()));

    let app = spawn_app();
    let (status, _) = app
        .get(
            "/api/users/acct:bob@example.org/principals",
            Some(&ADMIN.authorization()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let ids = spans.request_ids();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| !id.is_empty() && id != "req-42"));
}
