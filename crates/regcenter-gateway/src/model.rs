//! Request-scoped domain types

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Identifier of a service's configuration namespace and registry identity
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceKey(String);

impl ServiceKey {
    pub fn new(key: impl Into<String>) -> Result<Self, GatewayError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(GatewayError::BadRequest(
                "service key must not be empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A service's live configuration: an opaque JSON object
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationTree(Map<String, Value>);

impl ConfigurationTree {
    /// Decode a request body. Anything other than a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| GatewayError::BadRequest(e.to_string()))?;
        Self::try_from(value).map_err(|e| match e {
            GatewayError::TypeCheck { actual, .. } => GatewayError::BadRequest(format!(
                "configuration must be a JSON object, got {}",
                actual
            )),
            other => other,
        })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

}

impl TryFrom<Value> for ConfigurationTree {
    type Error = GatewayError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(GatewayError::TypeCheck {
                expected: "object",
                actual: json_kind(&other),
            }),
        }
    }
}

/// Name of a JSON value's kind, for diagnostics
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
