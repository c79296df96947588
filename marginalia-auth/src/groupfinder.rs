//! User id → principals, for the access-control layer
//!
//! The finder only sequences the lookup and the mapping. Which principals a
//! user gets is decided by [`principals_for_user`].

use crate::principals::{principals_for_user, PrincipalSet};
use marginalia_core::{LookupError, UserService};
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// Per-request data carried into the lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Context with a fresh random request id
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Composite lookup + resolve
#[derive(Clone)]
pub struct GroupFinder {
    user_service: Arc<dyn UserService>,
}

impl GroupFinder {
    pub fn new(user_service: Arc<dyn UserService>) -> Self {
        Self { user_service }
    }

    /// Principals for `userid`.
    ///
    /// Fetches the user exactly once. `Ok(None)` when the service has no such
    /// user. A service failure is returned as-is and never reported as a
    /// missing user.
    pub async fn find(
        &self,
        userid: &str,
        ctx: &RequestContext,
    ) -> Result<Option<PrincipalSet>, LookupError> {
        let span = info_span!("groupfinder", request_id = %ctx.request_id);

        async move {
            let user = self.user_service.fetch(userid).await.map_err(|e| {
                warn!(userid, error = %e, "User lookup failed");
                e
            })?;

            debug!(userid, found = user.is_some(), "User lookup completed");
            Ok(principals_for_user(user.as_ref()))
        }
        .instrument(span)
        .await
    }
}
