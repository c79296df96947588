//! Account identifiers: `acct:<username>@<authority>`

pub const ACCOUNT_PREFIX: &str = "acct:";

/// Split an account identifier into `(username, authority)`
pub fn split_userid(userid: &str) -> Option<(&str, &str)> {
    let rest = userid.strip_prefix(ACCOUNT_PREFIX)?;
    let (username, authority) = rest.rsplit_once('@')?;

    if username.is_empty() || authority.is_empty() {
        return None;
    }

    Some((username, authority))
}

pub fn format_userid(username: &str, authority: &str) -> String {
    format!("{}{}@{}", ACCOUNT_PREFIX, username, authority)
}
