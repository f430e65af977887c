//! Backend client factory
//!
//! Builds a configuration store or registry client bound to one request's
//! auth context. Construction itself is delegated to a [`ClientConnector`] so
//! the backend implementation can be swapped (tests use in-memory backends).

use std::sync::Arc;

use tracing::{debug, warn};

use regcenter_client::{
    BackendEndpointConfig, ClientError, ConfigStoreClient, ConsulConfigClient,
    ConsulRegistryClient, RegistryClient, RegistryClientConfig,
};

use crate::auth::AuthContext;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::model::ServiceKey;

/// Protocol the gateway serves its own API over
pub const DEFAULT_HTTP_PROTOCOL: &str = "http";

/// Route the registry polls to check the gateway's health
pub const API_PING_ROUTE: &str = "/api/v3/ping";

/// Constructs concrete backend clients from connection parameters
pub trait ClientConnector: Send + Sync {
    fn config_store(
        &self,
        config: BackendEndpointConfig,
    ) -> Result<Box<dyn ConfigStoreClient>, ClientError>;

    fn registry(&self, config: RegistryClientConfig)
    -> Result<Box<dyn RegistryClient>, ClientError>;
}

/// Connector for Consul-backed clients
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsulConnector;

impl ClientConnector for ConsulConnector {
    fn config_store(
        &self,
        config: BackendEndpointConfig,
    ) -> Result<Box<dyn ConfigStoreClient>, ClientError> {
        Ok(Box::new(ConsulConfigClient::new(&config)?))
    }

    fn registry(
        &self,
        config: RegistryClientConfig,
    ) -> Result<Box<dyn RegistryClient>, ClientError> {
        Ok(Box::new(ConsulRegistryClient::new(config)?))
    }
}

/// Builds per-request backend clients from process-wide configuration
#[derive(Clone)]
pub struct BackendClientFactory {
    config: Arc<GatewayConfig>,
    connector: Arc<dyn ClientConnector>,
}

impl BackendClientFactory {
    pub fn new(config: Arc<GatewayConfig>, connector: Arc<dyn ClientConnector>) -> Self {
        Self { config, connector }
    }

    /// Connection parameters for one service's configuration namespace
    pub fn config_store_endpoint(
        &self,
        service_key: &ServiceKey,
        auth: AuthContext,
    ) -> BackendEndpointConfig {
        let registry = &self.config.registry;
        BackendEndpointConfig::new(&registry.host, registry.port, &registry.r#type)
            .with_base_path(&self.config.config_base_path(service_key.as_str()))
            .with_auth_injector(auth.into_injector())
            .with_timeout(registry.timeout_ms)
    }

    /// Connection parameters for the registry, including the gateway's own
    /// registration metadata
    pub fn registry_client_config(&self, auth: AuthContext) -> RegistryClientConfig {
        let registry = &self.config.registry;
        let service = &self.config.service;
        RegistryClientConfig {
            endpoint: BackendEndpointConfig::new(&registry.host, registry.port, &registry.r#type)
                .with_auth_injector(auth.into_injector())
                .with_timeout(registry.timeout_ms),
            service_key: service.key.clone(),
            service_host: service.host.clone(),
            service_port: service.port,
            service_protocol: DEFAULT_HTTP_PROTOCOL.to_string(),
            check_interval: service.health_check_interval.clone(),
            check_route: API_PING_ROUTE.to_string(),
        }
    }

    /// Build a configuration store client and verify the store is running
    pub async fn config_store_client(
        &self,
        service_key: &ServiceKey,
        auth: AuthContext,
    ) -> Result<Box<dyn ConfigStoreClient>, GatewayError> {
        let endpoint = self.config_store_endpoint(service_key, auth);
        let backend_type = endpoint.r#type.clone();

        let client = self.connector.config_store(endpoint).map_err(|e| {
            warn!(service_key = %service_key, error = %e, "Configuration client construction failed");
            GatewayError::Connection(e.to_string())
        })?;

        if !client.is_alive().await {
            warn!(service_key = %service_key, "Configuration store is not running");
            return Err(GatewayError::NotRunning(backend_type));
        }

        debug!(service_key = %service_key, "Configuration client ready");
        Ok(client)
    }

    /// Build a registry client. Liveness is not probed here.
    pub fn registry_client(&self, auth: AuthContext) -> Result<Box<dyn RegistryClient>, GatewayError> {
        self.connector
            .registry(self.registry_client_config(auth))
            .map_err(|e| {
                warn!(error = %e, "Registry client construction failed");
                GatewayError::Connection(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> BackendClientFactory {
        let mut config = GatewayConfig::default();
        config.registry.host = "consul.local".to_string();
        config.registry.config_registry_stem = "edgex/".to_string();
        config.registry.service_version = "v4".to_string();
        config.registry.timeout_ms = 2500;
        config.service.key = "regcenter-gateway".to_string();
        config.service.host = "gateway.local".to_string();
        config.service.port = 4000;
        BackendClientFactory::new(Arc::new(config), Arc::new(ConsulConnector))
    }

    #[test]
    fn test_config_store_endpoint() {
        let key = ServiceKey::new("core-data").unwrap();
        let endpoint = factory().config_store_endpoint(&key, AuthContext::bearer("secret"));

        assert_eq!(endpoint.host, "consul.local");
        assert_eq!(endpoint.port, 8500);
        assert_eq!(endpoint.r#type, "consul");
        assert_eq!(endpoint.base_path, "edgex/v4/core-data");
        assert_eq!(endpoint.timeout_ms, 2500);
        assert!(endpoint.auth_injector.is_enabled());
    }

    #[test]
    fn test_config_store_endpoint_without_security() {
        let key = ServiceKey::new("core-data").unwrap();
        let endpoint = factory().config_store_endpoint(&key, AuthContext::none());
        assert!(!endpoint.auth_injector.is_enabled());
    }

    #[test]
    fn test_registry_client_config() {
        let config = factory().registry_client_config(AuthContext::none());

        assert_eq!(config.endpoint.base_path, "");
        assert_eq!(config.service_key, "regcenter-gateway");
        assert_eq!(config.service_protocol, "http");
        assert_eq!(config.check_interval, "10s");
        assert_eq!(config.check_url(), "http://gateway.local:4000/api/v3/ping");
    }

    #[test]
    fn test_consul_registry_client_construction() {
        assert!(factory().registry_client(AuthContext::none()).is_ok());
    }
}
