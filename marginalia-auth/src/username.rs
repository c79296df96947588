//! Username and password rules applied at registration

use crate::userid::format_userid;
use marginalia_core::{
    ErrorContext, LookupError, MarginaliaError, MarginaliaResult, UserService, UsernameConfig,
};
use regex::Regex;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN_BLACKLIST: &str = include_str!("blacklist.txt");

pub const MIN_PASSWORD_LENGTH: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must be at least {min} characters long")]
    TooShort { min: usize },

    #[error("Username must be at most {max} characters long")]
    TooLong { max: usize },

    #[error("Username may only contain letters, numbers, periods and underscores")]
    InvalidCharacters,

    // Also returned for reserved names
    #[error("Sorry, an account with this username already exists")]
    Taken,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Reserved usernames, lowercased. Built once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    names: HashSet<String>,
}

impl Blacklist {
    /// The list shipped with this crate
    pub fn builtin() -> Self {
        Self::from_lines(BUILTIN_BLACKLIST.lines())
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::from_lines(lines.iter().map(String::as_str)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> MarginaliaResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| MarginaliaError::Config {
            message: format!("Failed to open blacklist {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("username")
                .with_operation("load_blacklist")
                .with_suggestion("Check username.blacklist_path in your configuration"),
        })?;

        let blacklist = Self::from_reader(std::io::BufReader::new(file))?;
        info!(
            path = %path.display(),
            entries = blacklist.len(),
            "Loaded username blacklist"
        );
        Ok(blacklist)
    }

    fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let names = lines
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.names.contains(&username.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Registration rules for usernames and passwords
#[derive(Debug, Clone)]
pub struct UsernamePolicy {
    min_length: usize,
    max_length: usize,
    pattern: Regex,
    blacklist: Blacklist,
}

impl UsernamePolicy {
    pub fn new(min_length: usize, max_length: usize, blacklist: Blacklist) -> Self {
        Self {
            min_length,
            max_length,
            pattern: Regex::new(r"^[A-Za-z0-9._]+$").expect("static pattern"),
            blacklist,
        }
    }

    /// Build from configuration, reading the blacklist file when one is named
    pub fn from_config(config: &UsernameConfig) -> MarginaliaResult<Self> {
        let blacklist = match &config.blacklist_path {
            Some(path) => Blacklist::from_file(path)?,
            None => Blacklist::builtin(),
        };

        Ok(Self::new(config.min_length, config.max_length, blacklist))
    }

    /// Check length, characters and the blacklist
    pub fn validate(&self, username: &str) -> Result<(), UsernameError> {
        let length = username.chars().count();
        if length < self.min_length {
            return Err(UsernameError::TooShort {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            return Err(UsernameError::TooLong {
                max: self.max_length,
            });
        }
        if !self.pattern.is_match(username) {
            return Err(UsernameError::InvalidCharacters);
        }
        if self.blacklist.contains(username) {
            debug!(username, "Rejected reserved username");
            return Err(UsernameError::Taken);
        }

        Ok(())
    }

    /// Validate, then make sure no account already uses the name
    pub async fn check_available(
        &self,
        username: &str,
        authority: &str,
        users: &dyn UserService,
    ) -> Result<(), UsernameError> {
        self.validate(username)?;

        match users.fetch(&format_userid(username, authority)).await? {
            Some(_) => Err(UsernameError::Taken),
            None => Ok(()),
        }
    }

    pub fn validate_password(&self, password: &str) -> Result<(), UsernameError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UsernameError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }
}

impl Default for UsernamePolicy {
    fn default() -> Self {
        let config = UsernameConfig::default();
        Self::new(config.min_length, config.max_length, Blacklist::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use marginalia_core::UserRecord;
    use std::io::Cursor;

    struct OneUser(&'static str);

    #[async_trait]
    impl UserService for OneUser {
        async fn fetch(&self, userid: &str) -> Result<Option<UserRecord>, LookupError> {
            Ok((userid == self.0).then(|| UserRecord::new(userid, "taken")))
        }
    }

    struct Broken;

    #[async_trait]
    impl UserService for Broken {
        async fn fetch(&self, _userid: &str) -> Result<Option<UserRecord>, LookupError> {
            Err(LookupError::Timeout(30))
        }
    }

    fn policy_with(names: &str) -> UsernamePolicy {
        UsernamePolicy::new(3, 15, Blacklist::from_reader(Cursor::new(names)).unwrap())
    }

    #[test]
    fn test_accepts_ordinary_names() {
        let policy = policy_with("");
        assert_eq!(policy.validate("bob"), Ok(()));
        assert_eq!(policy.validate("Jane.Doe_99"), Ok(()));
    }

    #[test]
    fn test_length_bounds() {
        let policy = policy_with("");
        assert_eq!(policy.validate("ab"), Err(UsernameError::TooShort { min: 3 }));
        assert_eq!(
            policy.validate("abcdefghijklmnop"),
            Err(UsernameError::TooLong { max: 15 })
        );
        assert_eq!(policy.validate("abcdefghijklmno"), Ok(()));
    }

    #[test]
    fn test_rejects_other_characters() {
        let policy = policy_with("");
        assert_eq!(policy.validate("bob smith"), Err(UsernameError::InvalidCharacters));
        assert_eq!(policy.validate("bob:smith"), Err(UsernameError::InvalidCharacters));
        assert_eq!(policy.validate("bøb"), Err(UsernameError::InvalidCharacters));
    }

    #[test]
    fn test_blacklist_is_case_insensitive_and_looks_taken() {
        let policy = policy_with("  Admin \n\nroot\n");
        assert_eq!(policy.validate("admin"), Err(UsernameError::Taken));
        assert_eq!(policy.validate("ADMIN"), Err(UsernameError::Taken));
        assert_eq!(policy.validate("Root"), Err(UsernameError::Taken));
        assert_eq!(policy.validate("rooted"), Ok(()));
    }

    #[test]
    fn test_builtin_blacklist() {
        let blacklist = Blacklist::builtin();
        assert!(!blacklist.is_empty());
        assert!(blacklist.contains("Admin"));
        assert!(!blacklist.contains("giraffe"));
    }

    #[test]
    fn test_blacklist_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist");
        std::fs::write(&path, "giraffe\nElephant\n").unwrap();

        let policy = UsernamePolicy::from_config(&UsernameConfig {
            blacklist_path: Some(path.to_string_lossy().into_owned()),
            ..UsernameConfig::default()
        })
        .unwrap();

        assert_eq!(policy.validate("elephant"), Err(UsernameError::Taken));
        // Built-in list is replaced, not merged
        assert_eq!(policy.validate("admin"), Ok(()));
    }

    #[test]
    fn test_missing_blacklist_file() {
        let result = UsernamePolicy::from_config(&UsernameConfig {
            blacklist_path: Some("/no/such/blacklist".to_string()),
            ..UsernameConfig::default()
        });
        assert!(matches!(result, Err(MarginaliaError::Config { .. })));
    }

    #[test]
    fn test_password_length() {
        let policy = UsernamePolicy::default();
        assert_eq!(
            policy.validate_password("x"),
            Err(UsernameError::PasswordTooShort { min: 2 })
        );
        assert_eq!(policy.validate_password("xy"), Ok(()));
    }

    #[tokio::test]
    async fn test_check_available() {
        let policy = policy_with("");
        let users = OneUser("acct:bob@example.org");

        assert_eq!(
            policy.check_available("bob", "example.org", &users).await,
            Err(UsernameError::Taken)
        );
        assert_eq!(
            policy.check_available("alice", "example.org", &users).await,
            Ok(())
        );
    }

    #[tokio::test]
    async fn test_check_available_surfaces_lookup_failure() {
        let policy = policy_with("");

        assert_eq!(
            policy.check_available("alice", "example.org", &Broken).await,
            Err(UsernameError::Lookup(LookupError::Timeout(30)))
        );
    }
}
