use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use serde::Deserialize;

/// JWKS document as published by the provider (`/.well-known/jwks.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// One entry of a JWKS document. Only RSA members are modelled; anything else
/// is skipped when the key set is built.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

/// A provider-issued RSA verification key bound to one `kid`.
///
/// Immutable once built. Key material is not printable via Debug.
#[derive(Clone)]
pub struct PublicKey {
    kid: String,
    n: String,
    e: String,
    decoding_key: DecodingKey,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("kid", &self.kid).finish()
    }
}

impl PublicKey {
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Base64url modulus and exponent, exactly as published.
    pub fn components(&self) -> (&str, &str) {
        (&self.n, &self.e)
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Build a key from one JWK. Returns the reason when the entry is unusable.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, &'static str> {
        let kid = jwk
            .kid
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or("missing kid")?;

        if !jwk.kty.eq_ignore_ascii_case("RSA") {
            return Err("unsupported kty");
        }
        // Keys explicitly marked for encryption are never used to verify.
        if jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            return Err("not a signing key");
        }
        if jwk.alg.as_deref().is_some_and(|a| !a.starts_with("RS")) {
            return Err("unsupported alg");
        }

        let (n, e) = match (jwk.n.as_deref(), jwk.e.as_deref()) {
            (Some(n), Some(e)) => (n, e),
            _ => return Err("missing rsa components"),
        };

        let decoding_key =
            DecodingKey::from_rsa_components(n, e).map_err(|_| "invalid rsa components")?;

        Ok(Self {
            kid: kid.to_string(),
            n: n.to_string(),
            e: e.to_string(),
            decoding_key,
        })
    }
}

/// Keys from one successful fetch, indexed by `kid`.
pub type KeyMap = HashMap<String, Arc<PublicKey>>;

/// Turn a JWKS document into a `kid` index, dropping unusable entries.
pub fn index_keys(set: &JwkSet) -> KeyMap {
    let mut keys = KeyMap::with_capacity(set.keys.len());
    for jwk in &set.keys {
        match PublicKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(key.kid.clone(), Arc::new(key));
            }
            Err(reason) => {
                tracing::debug!(kid = ?jwk.kid, kty = %jwk.kty, reason, "skipping jwk");
            }
        }
    }
    keys
}
