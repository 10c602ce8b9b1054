/*
 * Responsibility
 * - POST /graphql の request/response envelope
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub operation_name: String,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

impl OperationRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.operation_name.trim();
        if name.is_empty() {
            return Err("operationName is required");
        }
        if name.len() > 128 {
            return Err("operationName must be <= 128 chars");
        }
        Ok(())
    }

    pub fn arguments(&self) -> Value {
        Value::Object(self.variables.clone().unwrap_or_default())
    }
}

/// `{ "data": { "<operationName>": <result> } }`
#[derive(Debug, Serialize)]
pub struct OperationResponse {
    pub data: Map<String, Value>,
}

impl OperationResponse {
    pub fn new(operation: &str, result: Value) -> Self {
        let mut data = Map::new();
        data.insert(operation.to_string(), result);
        Self { data }
    }
}
