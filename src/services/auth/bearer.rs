//! `Authorization` header → bearer credential.
//!
//! No structural validation happens here. A garbage string after the scheme is
//! still handed to the verifier and rejected there.

use std::fmt;

const BEARER_SCHEME: &str = "Bearer";

/// Opaque token string taken from `Authorization: Bearer <token>`.
///
/// Debug output is redacted so credentials never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerCredential").field(&"<redacted>").finish()
    }
}

/// Result of looking at the header. `None` is the anonymous path, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    None,
    Bearer(BearerCredential),
}

/// Extract a bearer credential from a raw header value.
///
/// The scheme match is case-sensitive. Missing/empty headers, other schemes and
/// a credential that trims to nothing all yield `Credential::None`.
pub fn parse_authorization(header: Option<&str>) -> Credential {
    let Some(value) = header else {
        return Credential::None;
    };

    let Some(rest) = value.trim().strip_prefix(BEARER_SCHEME) else {
        return Credential::None;
    };

    let token = rest.trim();
    if token.is_empty() {
        return Credential::None;
    }

    Credential::Bearer(BearerCredential(token.to_string()))
}
