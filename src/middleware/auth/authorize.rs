use std::sync::Arc;

use async_trait::async_trait;

use crate::api::v1::extractors::RequestCtx;
use crate::services::auth::rules::{Decision, RuleTable};
use crate::services::gateway::GatewayError;

use super::chain::Stage;

/// Gate the operation on the caller's capabilities.
#[derive(Debug, Clone)]
pub struct AuthorizationStage {
    rules: Arc<RuleTable>,
}

impl AuthorizationStage {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl Stage for AuthorizationStage {
    fn name(&self) -> &'static str {
        "authorize"
    }

    async fn apply(&self, operation: &str, ctx: RequestCtx) -> Result<RequestCtx, GatewayError> {
        match self.rules.authorize(operation, ctx.caller()) {
            Decision::Allow => Ok(ctx),
            Decision::Deny => {
                tracing::info!(
                    operation,
                    request_id = ctx.request_id(),
                    authenticated = ctx.is_authenticated(),
                    rule = ?self.rules.rule_for(operation),
                    "operation denied"
                );
                Err(GatewayError::Forbidden {
                    operation: operation.to_string(),
                })
            }
        }
    }
}
