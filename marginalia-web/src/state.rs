//! Shared application state

use crate::WebResult;
use marginalia_auth::{Authenticator, GroupFinder, UserDirectory, UsernamePolicy};
use marginalia_core::{MarginaliaConfig, UserService};
use std::sync::Arc;
use tracing::info;

/// Immutable services shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MarginaliaConfig>,
    pub user_service: Arc<dyn UserService>,
    pub authenticator: Arc<dyn Authenticator>,
    pub group_finder: GroupFinder,
    pub username_policy: Arc<UsernamePolicy>,
}

impl AppState {
    /// Build state backed by the in-memory directory from configuration
    pub fn new(config: MarginaliaConfig) -> WebResult<Self> {
        let directory = Arc::new(UserDirectory::from_config(&config)?);
        let username_policy = UsernamePolicy::from_config(&config.username)?;

        info!(
            authority = %config.authority,
            accounts = directory.len(),
            "Loaded user directory"
        );

        Ok(Self::with_services(
            config,
            directory.clone(),
            directory,
            username_policy,
        ))
    }

    /// Build state around externally provided services
    pub fn with_services(
        config: MarginaliaConfig,
        user_service: Arc<dyn UserService>,
        authenticator: Arc<dyn Authenticator>,
        username_policy: UsernamePolicy,
    ) -> Self {
        Self {
            config: Arc::new(config),
            group_finder: GroupFinder::new(user_service.clone()),
            user_service,
            authenticator,
            username_policy: Arc::new(username_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebError;
    use marginalia_core::{MarginaliaError, UserEntry};

    #[test]
    fn test_unusable_password_hash_fails_startup() {
        let mut config = MarginaliaConfig::default();
        config.users.push(UserEntry {
            username: "eve".to_string(),
            password_hash: "plaintext".to_string(),
            admin: false,
            staff: false,
            groups: Vec::new(),
        });

        let result = AppState::new(config);
        assert!(matches!(
            result,
            Err(WebError::Core(MarginaliaError::Config { .. }))
        ));
    }
}
