//! In-memory user directory
//!
//! Serves both user lookup and password authentication from the accounts
//! listed in configuration. Immutable once built.

use crate::credentials::Credentials;
use crate::userid::split_userid;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use marginalia_core::{
    ErrorContext, LookupError, MarginaliaConfig, MarginaliaError, MarginaliaResult, UserRecord,
    UserService,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns credentials into an account identifier
///
/// `Ok(None)` rejects the credentials. `Err` means the backing store failed.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<String>, LookupError>;
}

#[async_trait]
impl<T: Authenticator + ?Sized> Authenticator for Arc<T> {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<String>, LookupError> {
        (**self).authenticate(credentials).await
    }
}

#[derive(Debug, Clone)]
struct Account {
    record: UserRecord,
    password_hash: String,
}

/// Accounts keyed by lowercased username
#[derive(Debug, Clone)]
pub struct UserDirectory {
    authority: String,
    accounts: HashMap<String, Account>,
}

impl UserDirectory {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            accounts: HashMap::new(),
        }
    }

    /// Build from the `[[users]]` table. Fails on the first unusable hash.
    pub fn from_config(config: &MarginaliaConfig) -> MarginaliaResult<Self> {
        let mut directory = Self::new(config.authority.clone());
        for entry in &config.users {
            directory
                .insert(entry.to_record(&config.authority), entry.password_hash.clone())
                .map_err(|e| MarginaliaError::Config {
                    message: format!("User {}: {}", entry.username, e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("directory")
                        .with_operation("from_config")
                        .with_metadata("username", &entry.username),
                })?;
        }
        Ok(directory)
    }

    /// Add an account. A later insert with the same username replaces it.
    ///
    /// The hash must parse as a PHC string.
    pub fn insert(
        &mut self,
        record: UserRecord,
        password_hash: impl Into<String>,
    ) -> MarginaliaResult<()> {
        let password_hash = password_hash.into();
        parse_hash(&password_hash, "insert")?;

        self.accounts.insert(
            record.username.to_lowercase(),
            Account {
                record,
                password_hash,
            },
        );
        Ok(())
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.get(&username.to_lowercase())
    }
}

#[async_trait]
impl UserService for UserDirectory {
    async fn fetch(&self, userid: &str) -> Result<Option<UserRecord>, LookupError> {
        let Some((username, authority)) = split_userid(userid) else {
            debug!(userid, "Not an account identifier");
            return Ok(None);
        };

        if !authority.eq_ignore_ascii_case(&self.authority) {
            return Ok(None);
        }

        Ok(self.by_username(username).map(|account| account.record.clone()))
    }
}

#[async_trait]
impl Authenticator for UserDirectory {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<String>, LookupError> {
        let Some(account) = self.by_username(&credentials.username) else {
            debug!(username = %credentials.username, "Unknown username");
            return Ok(None);
        };

        match verify_password(&credentials.password, &account.password_hash) {
            Ok(true) => Ok(Some(account.record.userid.clone())),
            Ok(false) => {
                debug!(username = %credentials.username, "Password mismatch");
                Ok(None)
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Stored password hash is unusable");
                Err(LookupError::Backend(e.to_string()))
            }
        }
    }
}

/// Hash a password into an argon2 PHC string
pub fn hash_password(password: &str) -> MarginaliaResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MarginaliaError::Internal {
            message: format!("Failed to hash password: {}", e),
            source: None,
            context: ErrorContext::new("directory").with_operation("hash_password"),
        })
}

fn parse_hash<'a>(hash: &'a str, operation: &str) -> MarginaliaResult<PasswordHash<'a>> {
    PasswordHash::new(hash).map_err(|e| MarginaliaError::Config {
        message: format!("Invalid password hash: {}", e),
        source: None,
        context: ErrorContext::new("directory")
            .with_operation(operation)
            .with_suggestion("Store password_hash as an argon2 PHC string"),
    })
}

/// Verify a password against a PHC string
pub fn verify_password(password: &str, hash: &str) -> MarginaliaResult<bool> {
    let parsed_hash = parse_hash(hash, "verify_password")?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
