//! Client model types
//!
//! Wire shapes of the Consul HTTP API plus the endpoint type the registry
//! client hands back to callers.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// One registered service endpoint, read-only from the caller's perspective
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    #[serde(rename = "ServiceId")]
    pub service_id: String,
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "Healthy", skip_serializing_if = "Option::is_none", default)]
    pub healthy: Option<bool>,
}

/// Consul KV pair as returned by `GET /v1/kv/<prefix>?recurse`
#[derive(Clone, Debug, Deserialize)]
pub struct KVPair {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Value", default)]
    pub value: Option<String>, // Base64 encoded
}

impl KVPair {
    /// Decode the base64 value to UTF-8 text
    pub fn decoded_value(&self) -> Result<Option<String>> {
        let Some(raw) = &self.value else {
            return Ok(None);
        };
        let bytes = BASE64
            .decode(raw)
            .map_err(|e| ClientError::Decode(format!("key '{}': {}", self.key, e)))?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| ClientError::Decode(format!("key '{}': {}", self.key, e)))
    }
}

/// One operation of a `PUT /v1/txn` request
#[derive(Clone, Debug, Serialize)]
pub struct TxnOp {
    #[serde(rename = "KV")]
    pub kv: TxnKVOp,
}

#[derive(Clone, Debug, Serialize)]
pub struct TxnKVOp {
    #[serde(rename = "Verb")]
    pub verb: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String, // Base64 encoded
}

impl TxnOp {
    pub fn set(key: String, value: &str) -> Self {
        Self {
            kv: TxnKVOp {
                verb: "set".to_string(),
                key,
                value: BASE64.encode(value.as_bytes()),
            },
        }
    }
}

/// Agent service entry from `GET /v1/agent/services`
#[derive(Clone, Debug, Deserialize)]
pub struct AgentService {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "Address", default)]
    pub address: String,
    #[serde(rename = "Port", default)]
    pub port: u16,
}

impl From<AgentService> for ServiceEndpoint {
    fn from(service: AgentService) -> Self {
        Self {
            service_id: service.service,
            host: service.address,
            port: service.port,
            healthy: None,
        }
    }
}

/// Body of `PUT /v1/agent/service/register`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceRegistration {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub check: AgentServiceCheck,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceCheck {
    #[serde(rename = "HTTP")]
    pub http: String,
    pub interval: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_endpoint_serialization() {
        let endpoint = ServiceEndpoint {
            service_id: "core-data".to_string(),
            host: "edgex-core-data".to_string(),
            port: 59880,
            healthy: None,
        };
        assert_eq!(
            serde_json::to_value(&endpoint).unwrap(),
            json!({"ServiceId": "core-data", "Host": "edgex-core-data", "Port": 59880})
        );

        let endpoint = ServiceEndpoint {
            healthy: Some(true),
            ..endpoint
        };
        assert_eq!(serde_json::to_value(&endpoint).unwrap()["Healthy"], true);
    }

    #[test]
    fn test_kv_pair_decoding() {
        let pair: KVPair = serde_json::from_value(json!({
            "Key": "edgex/v4/core-data/Writable/LogLevel",
            "Value": BASE64.encode("INFO"),
            "Flags": 0
        }))
        .unwrap();
        assert_eq!(pair.decoded_value().unwrap().as_deref(), Some("INFO"));

        let folder: KVPair =
            serde_json::from_value(json!({"Key": "edgex/v4/core-data/", "Value": null})).unwrap();
        assert_eq!(folder.decoded_value().unwrap(), None);

        let broken = KVPair {
            key: "k".to_string(),
            value: Some("%%%".to_string()),
        };
        assert!(matches!(broken.decoded_value(), Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_txn_op_serialization() {
        let op = TxnOp::set("edgex/v4/core-data/Writable/LogLevel".to_string(), "DEBUG");
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"KV": {
                "Verb": "set",
                "Key": "edgex/v4/core-data/Writable/LogLevel",
                "Value": BASE64.encode("DEBUG")
            }})
        );
    }

    #[test]
    fn test_agent_service_into_endpoint() {
        let service: AgentService = serde_json::from_value(json!({
            "ID": "core-data-1",
            "Service": "core-data",
            "Address": "10.0.0.4",
            "Port": 59880,
            "Tags": []
        }))
        .unwrap();
        let endpoint = ServiceEndpoint::from(service);
        assert_eq!(endpoint.service_id, "core-data");
        assert_eq!(endpoint.host, "10.0.0.4");
        assert_eq!(endpoint.port, 59880);
    }
}
