//! Core data type definitions

use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// A group the user belongs to, identified by its public id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    pub public_identifier: String,
}

impl GroupRef {
    pub fn new(public_identifier: impl Into<String>) -> Self {
        Self {
            public_identifier: public_identifier.into(),
        }
    }
}

/// User record as returned by a user service. Read-only to this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identifier, e.g. `acct:bob@example.org`
    pub userid: String,
    pub username: String,
    pub admin: bool,
    pub staff: bool,
    /// Group memberships in the order the service reports them
    pub groups: Vec<GroupRef>,
}

impl UserRecord {
    pub fn new(userid: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            username: username.into(),
            admin: false,
            staff: false,
            groups: Vec::new(),
        }
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    pub fn with_staff(mut self, staff: bool) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_group(mut self, public_identifier: impl Into<String>) -> Self {
        self.groups.push(GroupRef::new(public_identifier));
        self
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginaliaConfig {
    /// Authority part of account identifiers (`acct:<username>@<authority>`)
    pub authority: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub username: UsernameConfig,
    /// Statically configured accounts for the in-memory directory
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Username policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernameConfig {
    pub min_length: usize,
    pub max_length: usize,
    /// File with one reserved name per line; the built-in list is used when unset
    pub blacklist_path: Option<String>,
}

/// One account in the `[[users]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub staff: bool,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserEntry {
    /// Build the record the directory serves for this entry
    pub fn to_record(&self, authority: &str) -> UserRecord {
        UserRecord {
            userid: format!("acct:{}@{}", self.username, authority),
            username: self.username.clone(),
            admin: self.admin,
            staff: self.staff,
            groups: self.groups.iter().map(GroupRef::new).collect(),
        }
    }
}
