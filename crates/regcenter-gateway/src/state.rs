//! Application state shared across all handlers

use std::sync::Arc;

use crate::auth::AuthContextResolver;
use crate::config::GatewayConfig;
use crate::factory::{BackendClientFactory, ClientConnector};
use crate::service::{ConfigurationService, RegistryService};

/// Read-only state handed to every request. Holds no backend clients; those
/// are built per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub config_service: ConfigurationService,
    pub registry_service: RegistryService,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>, connector: Arc<dyn ClientConnector>) -> Self {
        let resolver = AuthContextResolver::new(config.clone());
        let factory = BackendClientFactory::new(config.clone(), connector);

        Self {
            config_service: ConfigurationService::new(resolver.clone(), factory.clone()),
            registry_service: RegistryService::new(config.clone(), resolver, factory),
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("config_service", &"<ConfigurationService>")
            .field("registry_service", &"<RegistryService>")
            .finish()
    }
}
