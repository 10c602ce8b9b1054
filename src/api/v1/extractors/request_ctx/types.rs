/*
 * Responsibility
 * - Handler / auth stage から見える「リクエストコンテキスト」の型
 * - middleware が作って request extensions に格納し、auth chain が identity を足したコピーを返す
 *
 * Notes
 * - 既存の context は書き換えない。認証結果は `with_identity` で新しい値として作る
 */
use std::sync::Arc;

use crate::services::auth::rules::Caller;
use crate::services::auth::scopes::CapabilitySet;
use crate::services::auth::verifier::VerifiedClaims;

/// Who the verified token was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub issuer: String,
    pub expires_at: u64,
}

impl From<&VerifiedClaims> for Principal {
    fn from(claims: &VerifiedClaims) -> Self {
        Self {
            subject: claims.subject.clone(),
            issuer: claims.issuer.clone(),
            expires_at: claims.expires_at,
        }
    }
}

/// Per-request carrier handed down the auth chain to the operation handler.
///
/// - `authorization` is the raw header value, parsed by the authentication stage
/// - `principal` / `capabilities` are only set on the copy returned after verification
#[derive(Debug, Clone, Default)]
pub struct RequestCtx {
    request_id: Option<String>,
    authorization: Option<String>,
    principal: Option<Arc<Principal>>,
    capabilities: Arc<CapabilitySet>,
}

impl RequestCtx {
    pub fn new(request_id: Option<String>, authorization: Option<String>) -> Self {
        Self {
            request_id,
            authorization,
            ..Self::default()
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_deref()
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn caller(&self) -> Caller<'_> {
        Caller {
            authenticated: self.is_authenticated(),
            capabilities: &self.capabilities,
        }
    }

    /// Augmented copy carrying the verified identity; `self` is left untouched.
    pub fn with_identity(&self, principal: Principal, capabilities: CapabilitySet) -> Self {
        Self {
            principal: Some(Arc::new(principal)),
            capabilities: Arc::new(capabilities),
            ..self.clone()
        }
    }
}
