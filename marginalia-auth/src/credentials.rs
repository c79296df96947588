//! HTTP Basic credentials (RFC 7617)
//!
//! Decode-and-split only. The parser does not validate which characters the
//! username or password contain; producers are expected to keep control
//! characters out.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;

/// Authorization scheme accepted by [`Credentials::parse`]. Case-sensitive.
pub const BASIC_SCHEME: &str = "Basic";

/// Username and password taken from a Basic `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// May be empty
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Decode a scheme and base64 payload pair.
    ///
    /// Returns `None` when the scheme is missing or not exactly `Basic`, the
    /// payload is not valid base64 or UTF-8, or the decoded text has no `:`.
    /// The first `:` separates username from password, so passwords may
    /// contain colons and usernames may not.
    pub fn parse(scheme: Option<&str>, payload: impl AsRef<[u8]>) -> Option<Self> {
        if scheme? != BASIC_SCHEME {
            return None;
        }

        let decoded = BASE64.decode(payload.as_ref().trim_ascii()).ok()?;
        let user_pass = String::from_utf8(decoded).ok()?;
        let (username, password) = user_pass.split_once(':')?;

        Some(Self::new(username, password))
    }

    /// Parse a full header value such as `Basic Ym9iOnMzY3JldA==`
    pub fn from_authorization(header: &str) -> Option<Self> {
        let (scheme, payload) = header
            .trim()
            .split_once(|c: char| c.is_ascii_whitespace())?;
        Self::parse(Some(scheme), payload.trim())
    }

    /// Encode as an `Authorization` header value
    pub fn to_authorization(&self) -> String {
        let user_pass = format!("{}:{}", self.username, self.password);
        format!("{} {}", BASIC_SCHEME, BASE64.encode(user_pass.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(user_pass: &str) -> String {
        BASE64.encode(user_pass.as_bytes())
    }

    // RFC 5234 CTL = %x00-1F / %x7F
    fn is_ctl(c: char) -> bool {
        matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}')
    }

    fn username_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            any::<char>().prop_filter("user-id excludes CTL and ':'", |c| {
                !is_ctl(*c) && *c != ':'
            }),
            0..24,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    fn password_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            any::<char>().prop_filter("password excludes CTL", |c| !is_ctl(*c)),
            0..24,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn test_valid_user_pass_round_trips(
            username in username_strategy(),
            password in password_strategy(),
        ) {
            let payload = encode(&format!("{}:{}", username, password));
            let creds = Credentials::parse(Some("Basic"), payload);

            prop_assert_eq!(creds, Some(Credentials::new(username, password)));
        }
    }

    #[test]
    fn test_missing_scheme() {
        assert_eq!(Credentials::parse(None, encode("foo:bar")), None);
    }

    #[test]
    fn test_no_password_separator() {
        assert_eq!(Credentials::parse(Some("Basic"), encode("foobar")), None);
    }

    #[test]
    fn test_other_authorization_type() {
        assert_eq!(Credentials::parse(Some("Digest"), encode("foo:bar")), None);
    }

    #[test]
    fn test_scheme_is_case_sensitive() {
        assert_eq!(Credentials::parse(Some("basic"), encode("foo:bar")), None);
        assert_eq!(Credentials::parse(Some("BASIC"), encode("foo:bar")), None);
    }

    #[test]
    fn test_invalid_base64() {
        assert_eq!(Credentials::parse(Some("Basic"), "!!not base64!!"), None);
    }

    #[test]
    fn test_invalid_utf8() {
        let payload = BASE64.encode([0x66, 0x6f, 0x3a, 0xff, 0xfe]);
        assert_eq!(Credentials::parse(Some("Basic"), payload), None);
    }

    #[test]
    fn test_empty_password_is_kept() {
        let creds = Credentials::parse(Some("Basic"), encode("alice:")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "");
    }

    #[test]
    fn test_password_may_contain_colons() {
        let creds = Credentials::parse(Some("Basic"), encode("alice:a:b::c")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "a:b::c");
    }

    #[test]
    fn test_raw_bytes_payload() {
        let payload = encode("bob:s3cret");
        let creds = Credentials::parse(Some("Basic"), payload.as_bytes()).unwrap();
        assert_eq!(creds, Credentials::new("bob", "s3cret"));
    }

    #[test]
    fn test_from_authorization_header() {
        let header = format!("Basic   {}  ", encode("bob:s3cret"));
        assert_eq!(
            Credentials::from_authorization(&header),
            Some(Credentials::new("bob", "s3cret"))
        );

        assert_eq!(Credentials::from_authorization("Basic"), None);
        assert_eq!(Credentials::from_authorization("Bearer abc.def.ghi"), None);
        assert_eq!(Credentials::from_authorization(""), None);
    }

    #[test]
    fn test_header_round_trip() {
        let creds = Credentials::new("donna", "pässwörd");
        assert_eq!(
            Credentials::from_authorization(&creds.to_authorization()),
            Some(creds)
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("bob", "hunter2"));
        assert!(rendered.contains("bob"));
        assert!(!rendered.contains("hunter2"));
    }
}
