//! Bearer token → verified identity on the request context.
//!
//! - no credential: forward the context untouched (anonymous)
//! - credential present: verify it; any failure stops the invocation with one
//!   uniform authentication error, the specific cause only goes to the log
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::v1::extractors::{Principal, RequestCtx};
use crate::services::auth::TokenVerifier;
use crate::services::auth::bearer::{Credential, parse_authorization};
use crate::services::auth::scopes;
use crate::services::gateway::GatewayError;

use super::chain::Stage;

#[derive(Debug, Clone)]
pub struct AuthenticationStage {
    verifier: Arc<TokenVerifier>,
}

impl AuthenticationStage {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Stage for AuthenticationStage {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn apply(&self, operation: &str, ctx: RequestCtx) -> Result<RequestCtx, GatewayError> {
        let credential = match parse_authorization(ctx.authorization()) {
            Credential::None => return Ok(ctx),
            Credential::Bearer(credential) => credential,
        };

        let claims = match self.verifier.verify(&credential).await {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(
                    operation,
                    request_id = ctx.request_id(),
                    reason = err.kind(),
                    error = %err,
                    "access token verification failed"
                );
                return Err(GatewayError::Unauthenticated);
            }
        };

        let capabilities = scopes::extract(&claims);
        tracing::debug!(
            operation,
            sub = %claims.subject,
            scopes = capabilities.len(),
            "access token verified"
        );

        Ok(ctx.with_identity(Principal::from(&claims), capabilities))
    }
}
