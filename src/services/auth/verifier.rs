use std::{fmt, sync::Arc};

use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

use crate::services::auth::bearer::BearerCredential;
use crate::services::auth::keys::{KeyResolutionError, KeyResolver};
use crate::services::auth::token::UnverifiedToken;

/// Which claim check rejected the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimKind {
    Expiry,
    Audience,
    Issuer,
    Missing(String),
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expiry => write!(f, "token expired"),
            Self::Audience => write!(f, "unexpected 'aud'"),
            Self::Issuer => write!(f, "unexpected 'iss'"),
            Self::Missing(name) => write!(f, "missing '{}' claim", name),
        }
    }
}

/// Internal verification outcome. Callers must collapse every variant into
/// one authentication failure before anything leaves the process.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("verification key unavailable: {0}")]
    KeyUnavailable(#[from] KeyResolutionError),
    #[error("bad signature: {0}")]
    BadSignature(String),
    #[error("claim mismatch: {0}")]
    ClaimMismatch(ClaimKind),
}

impl VerificationError {
    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::KeyUnavailable(KeyResolutionError::UnknownKey(_)) => "unknown_key",
            Self::KeyUnavailable(KeyResolutionError::FetchFailed(_)) => "key_fetch_failed",
            Self::BadSignature(_) => "bad_signature",
            Self::ClaimMismatch(_) => "claim_mismatch",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::ClaimMismatch(ClaimKind::Expiry),
            ErrorKind::InvalidAudience => Self::ClaimMismatch(ClaimKind::Audience),
            ErrorKind::InvalidIssuer => Self::ClaimMismatch(ClaimKind::Issuer),
            ErrorKind::MissingRequiredClaim(name) => {
                Self::ClaimMismatch(ClaimKind::Missing(name.clone()))
            }
            // Signature already checked out, the payload just doesn't have the shape we need.
            ErrorKind::Json(_) | ErrorKind::Utf8(_) | ErrorKind::Base64(_) => {
                Self::Malformed(e.to_string())
            }
            _ => Self::BadSignature(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AudienceClaim {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    exp: u64,
    iss: String,
    aud: AudienceClaim,
    #[serde(default)]
    scope: Option<String>,
}

/// Claims of a token whose signature, issuer, audience and expiry all checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub expires_at: u64,
    pub audience: Vec<String>,
    pub issuer: String,
    pub scope: Option<String>,
}

impl From<RawClaims> for VerifiedClaims {
    fn from(raw: RawClaims) -> Self {
        let audience = match raw.aud {
            AudienceClaim::One(aud) => vec![aud],
            AudienceClaim::Many(auds) => auds,
        };

        Self {
            subject: raw.sub,
            expires_at: raw.exp,
            audience,
            issuer: raw.iss,
            scope: raw.scope,
        }
    }
}

/// Expected token parameters.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub issuer: String,
    pub audience: String,
    pub leeway_seconds: u64,
}

/// RS256 access-token verifier backed by a key resolver.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeyResolver>,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

const ALLOWED_ALGORITHM: Algorithm = Algorithm::RS256;

impl TokenVerifier {
    pub fn new(keys: Arc<dyn KeyResolver>, settings: &VerifierSettings) -> Self {
        let mut validation = Validation::new(ALLOWED_ALGORITHM);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = settings.leeway_seconds;

        Self { keys, validation }
    }

    /// Decode → algorithm → key lookup → signature → claims. The first failing step wins.
    pub async fn verify(
        &self,
        credential: &BearerCredential,
    ) -> Result<VerifiedClaims, VerificationError> {
        let token = credential.as_str();

        let unverified =
            UnverifiedToken::decode(token).map_err(|e| VerificationError::Malformed(e.to_string()))?;
        let kid = unverified
            .kid()
            .ok_or_else(|| VerificationError::Malformed("missing 'kid' header".into()))?;

        // Checked before the key lookup: a foreign alg never reaches the JWKS fetch.
        if unverified.header.alg.parse::<Algorithm>().ok() != Some(ALLOWED_ALGORITHM) {
            return Err(VerificationError::BadSignature(format!(
                "algorithm {:?} not allowed",
                unverified.header.alg
            )));
        }

        let key = self.keys.resolve(kid).await?;
        debug_assert_eq!(key.kid(), kid);

        let data = jsonwebtoken::decode::<RawClaims>(token, key.decoding_key(), &self.validation)?;

        Ok(data.claims.into())
    }
}
