use std::collections::BTreeSet;

use serde::Serialize;

use crate::services::auth::verifier::VerifiedClaims;

/// Capabilities granted to the caller, taken from the `scope` claim.
///
/// Set semantics: order and duplicates in the claim don't matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split a space-delimited scope string. ASCII whitespace only.
    pub fn from_scope(scope: &str) -> Self {
        Self(
            scope
                .split_ascii_whitespace()
                .map(str::to_string)
                .collect(),
        )
    }

    /// Exact string membership; no wildcards or hierarchy.
    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Capabilities of a verified caller. A missing or empty claim gives an empty set.
pub fn extract(claims: &VerifiedClaims) -> CapabilitySet {
    claims
        .scope
        .as_deref()
        .map(CapabilitySet::from_scope)
        .unwrap_or_default()
}
