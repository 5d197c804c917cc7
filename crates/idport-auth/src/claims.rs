//! Claim assembly.
//!
//! Builds the claim set embedded in signed tokens and surfaced by the
//! userinfo endpoint. Assembly is a pure function of the user record, the
//! authorization method, and the granted roles; identical inputs always
//! produce an identical claim set, in the same order.

use std::collections::BTreeMap;

use serde_json::Value;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::types::{ApplicationRole, AuthorizationMethod, User};

/// Claim name constants.
pub mod names {
    /// Subject identifier (user id).
    pub const SUB: &str = "sub";
    /// Login name as a stable identifier.
    pub const NAME_ID: &str = "name_id";
    /// Login name.
    pub const NAME: &str = "name";
    /// Human-readable display name.
    pub const DISPLAY_NAME: &str = "display_name";
    /// Full name; falls back to the login when no display name is set.
    pub const FULL_NAME: &str = "full_name";
    /// Last profile modification timestamp.
    pub const UPDATED_AT: &str = "updated_at";
    /// Authentication method reference.
    pub const AMR: &str = "amr";
    /// Granted role; repeated once per role.
    pub const ROLE: &str = "role";
}

/// A single named claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Claim name.
    pub name: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of claims. Names may repeat (roles do).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a claim.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.claims.push(Claim::new(name, value));
    }

    /// Returns the claims in assembly order.
    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Returns all values recorded under a name, in order.
    #[must_use]
    pub fn values_of(&self, name: &str) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.value.as_str())
            .collect()
    }

    /// Returns the first value recorded under a name.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Converts to a JSON map. A name that occurs once maps to a string;
    /// a repeated name maps to an array of its values in order.
    #[must_use]
    pub fn to_json_map(&self) -> BTreeMap<String, Value> {
        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        for claim in &self.claims {
            match map.get_mut(&claim.name) {
                None => {
                    map.insert(claim.name.clone(), Value::String(claim.value.clone()));
                }
                Some(Value::Array(values)) => {
                    values.push(Value::String(claim.value.clone()));
                }
                Some(existing) => {
                    let first = existing.clone();
                    *existing = Value::Array(vec![first, Value::String(claim.value.clone())]);
                }
            }
        }
        map
    }

    /// Converts to a deduplicated map: for repeated names the first
    /// occurrence wins. This is the userinfo shape.
    #[must_use]
    pub fn to_unique_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for claim in &self.claims {
            map.entry(claim.name.clone())
                .or_insert_with(|| claim.value.clone());
        }
        map
    }

    /// Number of claims, counting repeats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Formats a timestamp the way the `updated_at` claim carries it.
///
/// Fixed pattern, UTC, locale-independent.
#[must_use]
pub fn format_updated_at(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

/// The full name carried in tokens: the display name when set, the
/// login otherwise. Always present, unlike the display-name claim.
#[must_use]
pub fn full_name(user: &User) -> String {
    user.display_name
        .clone()
        .unwrap_or_else(|| user.login.clone())
}

/// Assembles the claim set for a user.
///
/// Pure and deterministic: no I/O, no clock reads. Roles appear in the
/// order given, one `role` claim each.
#[must_use]
pub fn assemble(user: &User, method: AuthorizationMethod, roles: &[ApplicationRole]) -> ClaimSet {
    let mut set = ClaimSet::new();
    set.push(names::SUB, user.id.to_string());
    set.push(names::NAME_ID, user.login.clone());
    set.push(names::NAME, user.login.clone());
    if let Some(display_name) = &user.display_name {
        set.push(names::DISPLAY_NAME, display_name.clone());
    }
    set.push(names::FULL_NAME, full_name(user));
    set.push(names::UPDATED_AT, format_updated_at(user.updated_at));
    set.push(names::AMR, method.as_str());
    for role in roles {
        set.push(names::ROLE, role.name.clone());
    }
    set
}
