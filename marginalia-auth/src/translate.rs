//! Principal vocabulary translation for annotation storage
//!
//! Annotations record their read/write principals in an older vocabulary.
//! Everything read from there goes through [`translate_annotation_principals`]
//! before it is compared against local access-control policy.

use crate::principals::{system, Principal, PrincipalSet};

/// How a rule recognises a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    Exact(&'static str),
    Prefix(&'static str),
}

impl Match {
    fn matches(&self, token: &str) -> bool {
        match self {
            Match::Exact(expected) => token == *expected,
            Match::Prefix(prefix) => token.starts_with(*prefix),
        }
    }
}

/// What happens to a matching token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Drop,
    Remap(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Match,
    pub action: Action,
}

/// Legacy "anyone can see this" group used by annotation storage
pub const LEGACY_WORLD_GROUP: &str = "group:__world__";

/// Rewrite table. First matching rule wins; unmatched tokens pass through.
///
/// Reserved system principals are never accepted from stored data. The
/// prefix rule covers any system token beyond the two named ones.
pub const RULES: &[Rule] = &[
    Rule {
        matcher: Match::Exact(system::EVERYONE),
        action: Action::Drop,
    },
    Rule {
        matcher: Match::Exact(system::ADMINS),
        action: Action::Drop,
    },
    Rule {
        matcher: Match::Prefix(system::PREFIX),
        action: Action::Drop,
    },
    Rule {
        matcher: Match::Exact(LEGACY_WORLD_GROUP),
        action: Action::Remap(system::EVERYONE),
    },
];

/// Translate a single token; `None` when it is dropped
pub fn translate_principal(token: &str) -> Option<Principal> {
    match RULES.iter().find(|rule| rule.matcher.matches(token)) {
        Some(Rule {
            action: Action::Drop,
            ..
        }) => None,
        Some(Rule {
            action: Action::Remap(replacement),
            ..
        }) => Some(Principal::new(*replacement)),
        None => Some(Principal::new(token)),
    }
}

/// Translate and deduplicate a list of stored principals
pub fn translate_annotation_principals<I, S>(principals: I) -> PrincipalSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    principals
        .into_iter()
        .filter_map(|token| translate_principal(token.as_ref()))
        .collect()
}
