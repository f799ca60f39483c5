//! Per-entity access policy parsed from header lines.
//!
//! ```text
//! Product .r admin,user .w admin .d admin
//! ```
//!
//! A token starting with `.r`, `.w` or `.d` marks the next token as a
//! comma-separated role list for reading, writing or deleting. Categories
//! without a marker stay unrestricted.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::parser::attribute_text;

/// Sentinel role meaning "unrestricted".
pub const ANY_ROLE: &str = "any";

/// A non-empty set of role names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// The unrestricted sentinel set `{"any"}`.
    pub fn any() -> Self {
        RoleSet(BTreeSet::from([ANY_ROLE.to_string()]))
    }

    /// Build a set from a comma-separated list.
    ///
    /// Returns `None` when the list holds no role names. A list mentioning
    /// `any` collapses to the sentinel.
    pub fn parse_list(list: &str) -> Option<Self> {
        let roles: BTreeSet<String> = list
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        if roles.is_empty() {
            None
        } else if roles.contains(ANY_ROLE) {
            Some(RoleSet::any())
        } else {
            Some(RoleSet(roles))
        }
    }

    /// Whether this is the unrestricted sentinel.
    pub fn is_any(&self) -> bool {
        self.0.contains(ANY_ROLE)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        RoleSet::any()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

/// Read, write and delete role sets of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessPolicy {
    pub read_roles: RoleSet,
    pub write_roles: RoleSet,
    pub delete_roles: RoleSet,
}

/// Something on a header line that was not understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderIssue {
    /// `.r` / `.w` / `.d` without a usable role list after it
    MissingRoleList { marker: String },
    /// A token that is neither a marker nor a role list
    UnknownToken { token: String },
}

impl AccessPolicy {
    /// Whether every category is unrestricted.
    pub fn is_unrestricted(&self) -> bool {
        self.read_roles.is_any() && self.write_roles.is_any() && self.delete_roles.is_any()
    }

    /// Parse the tokens that follow the entity name on a header line.
    pub fn from_header_tokens(tokens: &[&str]) -> (Self, Vec<HeaderIssue>) {
        let mut policy = AccessPolicy::default();
        let mut issues = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            let slot = if token.starts_with(".r") {
                Some(&mut policy.read_roles)
            } else if token.starts_with(".w") {
                Some(&mut policy.write_roles)
            } else if token.starts_with(".d") {
                Some(&mut policy.delete_roles)
            } else {
                None
            };

            let Some(slot) = slot else {
                issues.push(HeaderIssue::UnknownToken {
                    token: token.to_string(),
                });
                i += 1;
                continue;
            };

            let list = tokens.get(i + 1).filter(|next| !next.starts_with('.'));
            match list.and_then(|l| RoleSet::parse_list(l)) {
                Some(roles) => {
                    *slot = roles;
                    i += 2;
                }
                None => {
                    issues.push(HeaderIssue::MissingRoleList {
                        marker: token.to_string(),
                    });
                    i += if list.is_some() { 2 } else { 1 };
                }
            }
        }

        (policy, issues)
    }
}

/// Access policy of `entity_name` as declared in the definition `text`.
///
/// Only header lines are considered. When the entity is declared more than
/// once the last declaration wins; an undeclared entity is unrestricted.
pub fn get_access(entity_name: &str, text: &str) -> AccessPolicy {
    let mut policy = AccessPolicy::default();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || attribute_text(line).is_some() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.first() == Some(&entity_name) {
            policy = AccessPolicy::from_header_tokens(&tokens[1..]).0;
        }
    }
    policy
}
