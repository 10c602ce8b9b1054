//! Operation dispatch: name → handler, wrapped by the auth chain.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::api::v1::extractors::RequestCtx;
use crate::middleware::auth::chain::Chain;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("not authorised")]
    Unauthenticated,
    #[error("caller lacks the capability required by '{operation}'")]
    Forbidden { operation: String },
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("internal error")]
    Internal,
}

/// One API operation (a query or mutation field).
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn call(&self, args: Value, ctx: &RequestCtx) -> Result<Value, GatewayError>;
}

/// Parse operation arguments into a typed struct.
pub fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, GatewayError> {
    serde_json::from_value(args).map_err(|e| GatewayError::InvalidArguments(e.to_string()))
}

#[derive(Default, Clone)]
pub struct OperationRegistry {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, handler: impl OperationHandler + 'static) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn OperationHandler>> {
        self.handlers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

pub struct Gateway {
    registry: OperationRegistry,
    chain: Chain,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.registry.names().collect();
        names.sort_unstable();
        f.debug_struct("Gateway")
            .field("operations", &names)
            .field("chain", &self.chain)
            .finish()
    }
}

impl Gateway {
    pub fn new(registry: OperationRegistry, chain: Chain) -> Self {
        Self { registry, chain }
    }

    /// Unknown names are rejected before any token work happens.
    pub async fn execute(
        &self,
        operation: &str,
        args: Value,
        ctx: RequestCtx,
    ) -> Result<Value, GatewayError> {
        let handler = self
            .registry
            .get(operation)
            .ok_or_else(|| GatewayError::UnknownOperation(operation.to_string()))?;

        self.chain.run(operation, args, ctx, handler.as_ref()).await
    }
}
