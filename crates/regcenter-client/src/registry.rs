//! Service registry client
//!
//! The Consul implementation talks to the local agent API. The client carries
//! the calling service's registration metadata so the same handle can list
//! endpoints and (de)register the caller itself.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::RegistryClientConfig;
use crate::error::Result;
use crate::http::ConsulHttp;
use crate::model::{AgentService, AgentServiceCheck, AgentServiceRegistration, ServiceEndpoint};

const AGENT_SERVICES_PATH: &str = "/v1/agent/services";
const AGENT_REGISTER_PATH: &str = "/v1/agent/service/register";
const AGENT_DEREGISTER_PATH: &str = "/v1/agent/service/deregister/";

/// Registry operations available to the gateway
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Register the calling service with a health check
    async fn register(&self) -> Result<()>;

    /// Remove the calling service's registration
    async fn unregister(&self) -> Result<()>;

    /// Every endpoint currently registered, ordered by service id
    async fn get_all_service_endpoints(&self) -> Result<Vec<ServiceEndpoint>>;

    /// Whether the registry itself is reachable and has a leader
    async fn is_alive(&self) -> bool;
}

/// Consul agent backed registry client
pub struct ConsulRegistryClient {
    http: ConsulHttp,
    config: RegistryClientConfig,
}

impl ConsulRegistryClient {
    pub fn new(config: RegistryClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: ConsulHttp::new(&config.endpoint)?,
            config,
        })
    }
}

#[async_trait]
impl RegistryClient for ConsulRegistryClient {
    async fn register(&self) -> Result<()> {
        let registration = AgentServiceRegistration {
            id: self.config.service_key.clone(),
            name: self.config.service_key.clone(),
            address: self.config.service_host.clone(),
            port: self.config.service_port,
            check: AgentServiceCheck {
                http: self.config.check_url(),
                interval: self.config.check_interval.clone(),
            },
        };

        self.http
            .send(self.http.put(AGENT_REGISTER_PATH).json(&registration))
            .await?;

        info!(
            service_key = %self.config.service_key,
            check_url = %registration.check.http,
            "Registered service with registry"
        );
        Ok(())
    }

    async fn unregister(&self) -> Result<()> {
        let path = format!("{}{}", AGENT_DEREGISTER_PATH, self.config.service_key);
        self.http.send(self.http.put(&path)).await?;

        info!(service_key = %self.config.service_key, "Deregistered service from registry");
        Ok(())
    }

    async fn get_all_service_endpoints(&self) -> Result<Vec<ServiceEndpoint>> {
        let services: HashMap<String, AgentService> = self
            .http
            .send_json(self.http.get(AGENT_SERVICES_PATH))
            .await?;

        let mut endpoints: Vec<ServiceEndpoint> =
            services.into_values().map(ServiceEndpoint::from).collect();
        endpoints.sort_by(|a, b| {
            a.service_id
                .cmp(&b.service_id)
                .then_with(|| a.host.cmp(&b.host))
                .then_with(|| a.port.cmp(&b.port))
        });

        debug!(count = endpoints.len(), "Fetched registered service endpoints");
        Ok(endpoints)
    }

    async fn is_alive(&self) -> bool {
        self.http.leader_elected().await
    }
}
