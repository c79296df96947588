//! Core trait definitions

use crate::error::LookupError;
use crate::types::UserRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// User lookup capability
///
/// `Ok(None)` means the lookup completed and no such user exists. `Err` means
/// the service itself failed and must not be read as "not found".
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch a user by account identifier
    async fn fetch(&self, userid: &str) -> Result<Option<UserRecord>, LookupError>;
}

#[async_trait]
impl<T: UserService + ?Sized> UserService for Arc<T> {
    async fn fetch(&self, userid: &str) -> Result<Option<UserRecord>, LookupError> {
        (**self).fetch(userid).await
    }
}
