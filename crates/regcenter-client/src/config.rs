//! Connection parameters for backend clients
//!
//! Both structures are assembled per request by the gateway and handed to a
//! client constructor; clients never keep a reference back to process
//! configuration.

use crate::auth::AuthInjector;
use crate::error::{ClientError, Result};

/// Backend type served by the bundled clients
pub const CONSUL_TYPE: &str = "consul";

/// Default outbound request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Connection parameters for one configuration store or registry backend
#[derive(Clone, Debug)]
pub struct BackendEndpointConfig {
    pub host: String,
    pub port: u16,
    /// Backend flavour (only "consul" is supported)
    pub r#type: String,
    /// Key prefix the client is scoped to; empty for the registry
    pub base_path: String,
    pub auth_injector: AuthInjector,
    /// Deadline applied to every outbound request
    pub timeout_ms: u64,
}

impl BackendEndpointConfig {
    pub fn new(host: &str, port: u16, r#type: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            r#type: r#type.to_string(),
            base_path: String::new(),
            auth_injector: AuthInjector::none(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.to_string();
        self
    }

    pub fn with_auth_injector(mut self, auth_injector: AuthInjector) -> Self {
        self.auth_injector = auth_injector;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Scheme, host and port of the backend, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ClientError::InvalidConfig("host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(ClientError::InvalidConfig("port is not set".to_string()));
        }
        if !self.r#type.eq_ignore_ascii_case(CONSUL_TYPE) {
            return Err(ClientError::UnsupportedType(self.r#type.clone()));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Registry connection parameters plus the calling service's own
/// registration metadata
#[derive(Clone, Debug)]
pub struct RegistryClientConfig {
    pub endpoint: BackendEndpointConfig,
    pub service_key: String,
    pub service_host: String,
    pub service_port: u16,
    pub service_protocol: String,
    /// Health-check interval in the backend's duration syntax (e.g. "10s")
    pub check_interval: String,
    pub check_route: String,
}

impl RegistryClientConfig {
    /// URL the registry polls to check the calling service's health
    pub fn check_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.service_protocol, self.service_host, self.service_port, self.check_route
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint.validate()?;
        if self.service_key.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "service key is empty".to_string(),
            ));
        }
        Ok(())
    }
}
