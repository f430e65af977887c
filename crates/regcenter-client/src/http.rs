//! HTTP plumbing shared by the Consul-backed clients
//!
//! Every client owns its own `reqwest::Client`; nothing is pooled across
//! gateway requests.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::auth::AuthInjector;
use crate::config::BackendEndpointConfig;
use crate::error::{ClientError, Result};

/// Leader status endpoint used as the liveness probe
pub const STATUS_LEADER_PATH: &str = "/v1/status/leader";

/// Thin HTTP wrapper bound to one backend address and credential
pub struct ConsulHttp {
    client: Client,
    base_url: String,
    auth: AuthInjector,
}

impl ConsulHttp {
    pub fn new(config: &BackendEndpointConfig) -> Result<Self> {
        config.validate()?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            auth: config.auth_injector.clone(),
        })
    }

    /// Build full URL for an API path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.auth.inject(self.client.get(self.build_url(path)))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.auth.inject(self.client.put(self.build_url(path)))
    }

    /// Send a request and fail on any non-success status
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            error!("Request failed with status {}: {}", status, body);
            Err(ClientError::RequestFailed {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Send a request and parse the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send a request and parse the JSON body, mapping 404 to `None`
    pub async fn send_json_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Request failed with status {}: {}", status, body);
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(Some(response.json::<T>().await?))
    }

    /// True when the backend answers the leader probe with an elected leader
    pub async fn leader_elected(&self) -> bool {
        match self.send_json::<String>(self.get(STATUS_LEADER_PATH)).await {
            Ok(leader) => !leader.is_empty(),
            Err(e) => {
                debug!(url = %self.base_url, error = %e, "Leader probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let config = BackendEndpointConfig::new("localhost", 8500, "consul");
        let http = ConsulHttp::new(&config).unwrap();

        assert_eq!(
            http.build_url("/v1/kv/edgex"),
            "http://localhost:8500/v1/kv/edgex"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = BackendEndpointConfig::new("localhost", 8500, "zookeeper");
        assert!(matches!(
            ConsulHttp::new(&config),
            Err(ClientError::UnsupportedType(_))
        ));
    }
}
