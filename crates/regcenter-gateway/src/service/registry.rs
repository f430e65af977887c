//! Registry listing, liveness and self-registration

use std::sync::Arc;

use tracing::{info, warn};

use regcenter_client::ServiceEndpoint;

use crate::auth::{AuthContext, AuthContextResolver};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::factory::BackendClientFactory;

#[derive(Clone)]
pub struct RegistryService {
    config: Arc<GatewayConfig>,
    resolver: AuthContextResolver,
    factory: BackendClientFactory,
}

impl RegistryService {
    pub fn new(
        config: Arc<GatewayConfig>,
        resolver: AuthContextResolver,
        factory: BackendClientFactory,
    ) -> Self {
        Self {
            config,
            resolver,
            factory,
        }
    }

    /// Every endpoint currently registered. No services is an empty list.
    pub async fn list_endpoints(
        &self,
        inbound_token: Option<&str>,
    ) -> Result<Vec<ServiceEndpoint>, GatewayError> {
        let auth = self.resolver.resolve(inbound_token).await?;
        let client = self.factory.registry_client(auth)?;

        client.get_all_service_endpoints().await.map_err(|e| {
            warn!(error = %e, "Listing registry endpoints failed");
            GatewayError::Registry(e.to_string())
        })
    }

    /// Succeeds only when the registry is reachable and serving
    pub async fn ping(&self, inbound_token: Option<&str>) -> Result<(), GatewayError> {
        let auth = self.resolver.resolve(inbound_token).await?;
        let client = self.factory.registry_client(auth)?;

        if client.is_alive().await {
            return Ok(());
        }

        let registry = &self.config.registry;
        let message = format!(
            "registry ({}) at {}:{} is not alive",
            registry.r#type, registry.host, registry.port
        );
        warn!("{}", message);
        Err(GatewayError::RegistryUnavailable(message))
    }

    /// Register the gateway itself, with a health check against its ping route
    pub async fn register_self(&self) -> Result<(), GatewayError> {
        let client = self.factory.registry_client(AuthContext::none())?;
        client
            .register()
            .await
            .map_err(|e| GatewayError::Registry(e.to_string()))?;
        info!("Gateway registered with registry");
        Ok(())
    }

    pub async fn deregister_self(&self) -> Result<(), GatewayError> {
        let client = self.factory.registry_client(AuthContext::none())?;
        client
            .unregister()
            .await
            .map_err(|e| GatewayError::Registry(e.to_string()))?;
        info!("Gateway deregistered from registry");
        Ok(())
    }
}
