//! Principals and the user → principal mapping

use marginalia_core::UserRecord;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Role principals
pub mod role {
    pub const ADMIN: &str = "group:__admin__";
    pub const STAFF: &str = "group:__staff__";
}

/// Principals from the framework-level vocabulary
pub mod system {
    pub const EVERYONE: &str = "system.Everyone";
    pub const AUTHENTICATED: &str = "system.Authenticated";
    pub const ADMINS: &str = "system.Admins";

    /// Every reserved system principal starts with this
    pub const PREFIX: &str = "system.";
}

pub const GROUP_PREFIX: &str = "group:";

/// An opaque authorization token: a role, a group membership or an identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

/// Resolved authorization context for a request
pub type PrincipalSet = BTreeSet<Principal>;

impl Principal {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn admin() -> Self {
        Self::new(role::ADMIN)
    }

    pub fn staff() -> Self {
        Self::new(role::STAFF)
    }

    pub fn everyone() -> Self {
        Self::new(system::EVERYONE)
    }

    pub fn authenticated() -> Self {
        Self::new(system::AUTHENTICATED)
    }

    /// `group:<public_identifier>`
    pub fn group(public_identifier: &str) -> Self {
        Self(format!("{}{}", GROUP_PREFIX, public_identifier))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Principal {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Principal {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Principals granted to a user.
///
/// `None` for a missing user: no additional authorization context, which is
/// not the same as an empty set. Otherwise the admin and staff roles when the
/// flags are set, plus one `group:` principal per membership.
pub fn principals_for_user(user: Option<&UserRecord>) -> Option<PrincipalSet> {
    let user = user?;

    let mut principals = PrincipalSet::new();
    if user.admin {
        principals.insert(Principal::admin());
    }
    if user.staff {
        principals.insert(Principal::staff());
    }
    principals.extend(
        user.groups
            .iter()
            .map(|group| Principal::group(&group.public_identifier)),
    );

    Some(principals)
}
