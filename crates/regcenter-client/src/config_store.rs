//! Configuration store client
//!
//! A configuration store holds one key/value tree per service namespace. The
//! Consul implementation maps nested JSON objects onto `/`-separated KV keys
//! under the client's base path.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::config::BackendEndpointConfig;
use crate::error::{ClientError, Result};
use crate::http::ConsulHttp;
use crate::model::{KVPair, TxnOp};

/// Upper bound of operations Consul accepts in one transaction
pub const MAX_TXN_OPS: usize = 64;

const KV_PATH: &str = "/v1/kv/";
const TXN_PATH: &str = "/v1/txn";

/// Access to one service's configuration namespace
#[async_trait]
pub trait ConfigStoreClient: Send + Sync {
    /// Whether any configuration exists under the namespace
    async fn has_configuration(&self) -> Result<bool>;

    /// Fetch the whole namespace as an untyped JSON value
    async fn get_configuration(&self) -> Result<Value>;

    /// Bulk-write a configuration tree. With `overwrite == false` keys that
    /// already exist keep their current value.
    async fn put_configuration_map(
        &self,
        configuration: &Map<String, Value>,
        overwrite: bool,
    ) -> Result<()>;

    /// Liveness probe for the backing store
    async fn is_alive(&self) -> bool;
}

/// Consul KV backed configuration store client
pub struct ConsulConfigClient {
    http: ConsulHttp,
    base_path: String,
}

impl ConsulConfigClient {
    pub fn new(config: &BackendEndpointConfig) -> Result<Self> {
        let base_path = config.base_path.trim_matches('/').to_string();
        if base_path.is_empty() {
            return Err(ClientError::InvalidConfig(
                "configuration base path is empty".to_string(),
            ));
        }

        Ok(Self {
            http: ConsulHttp::new(config)?,
            base_path,
        })
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Namespace prefix including the trailing separator, so that
    /// `core-data` never matches keys of `core-data-ext`
    fn prefix(&self) -> String {
        format!("{}/", self.base_path)
    }

    async fn existing_keys(&self) -> Result<Vec<String>> {
        let request = self
            .http
            .get(&format!("{}{}", KV_PATH, self.prefix()))
            .query(&[("keys", "")]);
        Ok(self
            .http
            .send_json_optional::<Vec<String>>(request)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl ConfigStoreClient for ConsulConfigClient {
    async fn has_configuration(&self) -> Result<bool> {
        let keys = self.existing_keys().await?;
        debug!(
            base_path = %self.base_path,
            key_count = keys.len(),
            "Checked configuration existence"
        );
        Ok(!keys.is_empty())
    }

    async fn get_configuration(&self) -> Result<Value> {
        let request = self
            .http
            .get(&format!("{}{}", KV_PATH, self.prefix()))
            .query(&[("recurse", "")]);
        let pairs = self
            .http
            .send_json_optional::<Vec<KVPair>>(request)
            .await?
            .unwrap_or_default();

        let prefix = self.prefix();
        let mut tree = Map::new();
        for pair in &pairs {
            let Some(relative) = pair.key.strip_prefix(&prefix) else {
                continue;
            };
            let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
            if segments.is_empty() {
                continue;
            }
            // Folder keys carry no value
            let Some(text) = pair.decoded_value()? else {
                continue;
            };
            insert_path(&mut tree, &segments, decode_leaf(text));
        }

        Ok(Value::Object(tree))
    }

    async fn put_configuration_map(
        &self,
        configuration: &Map<String, Value>,
        overwrite: bool,
    ) -> Result<()> {
        let mut entries = Vec::new();
        flatten(&self.base_path, configuration, &mut entries);

        if !overwrite {
            let existing: HashSet<String> = self.existing_keys().await?.into_iter().collect();
            entries.retain(|(key, _)| !existing.contains(key));
        }

        if entries.is_empty() {
            debug!(base_path = %self.base_path, "Nothing to write");
            return Ok(());
        }

        let ops: Vec<TxnOp> = entries
            .into_iter()
            .map(|(key, value)| TxnOp::set(key, &value))
            .collect();

        if ops.len() > MAX_TXN_OPS {
            warn!(
                base_path = %self.base_path,
                op_count = ops.len(),
                "Configuration exceeds one transaction, writing in {} chunks",
                ops.len().div_ceil(MAX_TXN_OPS)
            );
        }

        // Each chunk commits on its own; a later failure leaves earlier chunks in place
        let total = ops.len();
        let mut committed = 0;
        for chunk in ops.chunks(MAX_TXN_OPS) {
            if let Err(e) = self.http.send(self.http.put(TXN_PATH).json(chunk)).await {
                if committed == 0 {
                    return Err(e);
                }
                error!(
                    base_path = %self.base_path,
                    committed,
                    total,
                    error = %e,
                    "Configuration write failed after partial commit"
                );
                return Err(ClientError::PartialWrite {
                    committed,
                    total,
                    source: Box::new(e),
                });
            }
            committed += chunk.len();
        }

        debug!(base_path = %self.base_path, "Configuration written");
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.http.leader_elected().await
    }
}

/// Flatten a JSON tree into `(full_key, text_value)` pairs.
///
/// Strings are stored verbatim; every other leaf is stored as its JSON text.
/// Empty objects have no KV representation and are skipped.
pub fn flatten(prefix: &str, tree: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in tree {
        let path = format!("{}/{}", prefix, key);
        match value {
            Value::Object(child) => flatten(&path, child, out),
            Value::String(s) => out.push((path, s.clone())),
            other => out.push((path, other.to_string())),
        }
    }
}

/// Recover a typed leaf from its stored text.
///
/// Numbers, booleans, null and arrays come back typed; anything else is a
/// string.
pub fn decode_leaf(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null | Value::Array(_))) => value,
        _ => Value::String(text),
    }
}

/// Insert `value` at the nested position named by `segments`. A scalar that
/// sits where a nested key needs an object is replaced by that object.
pub fn insert_path(tree: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = tree;
    for segment in parents {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    node.insert(last.to_string(), value);
}
