//! Interceptor chain around operation handlers.
//!
//! Each stage either forwards a (possibly augmented) context to the next one
//! or stops the invocation with an error. Stages run strictly in order and the
//! handler only runs after every stage has forwarded.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::v1::extractors::RequestCtx;
use crate::services::auth::TokenVerifier;
use crate::services::auth::rules::RuleTable;
use crate::services::gateway::{GatewayError, OperationHandler};

use super::authenticate::AuthenticationStage;
use super::authorize::AuthorizationStage;

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(ctx)` forwards, `Err` short-circuits the invocation.
    async fn apply(&self, operation: &str, ctx: RequestCtx) -> Result<RequestCtx, GatewayError>;
}

#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<Arc<dyn Stage>>,
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// authenticate → authorize → handler
    pub fn auth(verifier: Arc<TokenVerifier>, rules: Arc<RuleTable>) -> Self {
        Self::new()
            .with_stage(AuthenticationStage::new(verifier))
            .with_stage(AuthorizationStage::new(rules))
    }

    pub async fn run(
        &self,
        operation: &str,
        args: Value,
        ctx: RequestCtx,
        handler: &dyn OperationHandler,
    ) -> Result<Value, GatewayError> {
        let mut ctx = ctx;
        for stage in &self.stages {
            ctx = stage.apply(operation, ctx).await?;
        }

        handler.call(args, &ctx).await
    }
}
