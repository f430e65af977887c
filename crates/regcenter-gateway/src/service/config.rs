//! Configuration read and write operations

use tracing::{debug, error, info, warn};

use regcenter_client::ClientError;

use crate::auth::AuthContextResolver;
use crate::error::GatewayError;
use crate::factory::BackendClientFactory;
use crate::model::{ConfigurationTree, ServiceKey};

/// Reads and writes one service's configuration tree per call
#[derive(Clone)]
pub struct ConfigurationService {
    resolver: AuthContextResolver,
    factory: BackendClientFactory,
}

impl ConfigurationService {
    pub fn new(resolver: AuthContextResolver, factory: BackendClientFactory) -> Self {
        Self { resolver, factory }
    }

    /// Replace the service's configuration with `tree` in one bulk put
    pub async fn write(
        &self,
        service_key: &ServiceKey,
        inbound_token: Option<&str>,
        tree: ConfigurationTree,
    ) -> Result<(), GatewayError> {
        let auth = self.resolver.resolve(inbound_token).await?;
        let client = self.factory.config_store_client(service_key, auth).await?;

        client
            .put_configuration_map(tree.as_map(), true)
            .await
            .map_err(|e| {
                match &e {
                    ClientError::PartialWrite {
                        committed, total, ..
                    } => error!(
                        service_key = %service_key,
                        committed = *committed,
                        total = *total,
                        error = %e,
                        "Configuration partially written"
                    ),
                    _ => warn!(service_key = %service_key, error = %e, "Configuration write failed"),
                }
                GatewayError::WriteFailed(e.to_string())
            })?;

        info!(service_key = %service_key, keys = tree.as_map().len(), "Configuration written");
        Ok(())
    }

    /// Fetch the service's configuration tree. A namespace the store does not
    /// know about is reported as not found.
    pub async fn read(
        &self,
        service_key: &ServiceKey,
        inbound_token: Option<&str>,
    ) -> Result<ConfigurationTree, GatewayError> {
        let not_found =
            || GatewayError::NotFound(format!("service [{}] not found on register center", service_key));

        let auth = self.resolver.resolve(inbound_token).await?;
        let client = self
            .factory
            .config_store_client(service_key, auth)
            .await
            .map_err(GatewayError::into_not_found)?;

        match client.has_configuration().await {
            Ok(true) => {}
            Ok(false) => {
                debug!(service_key = %service_key, "No configuration stored");
                return Err(not_found());
            }
            Err(e) => {
                warn!(service_key = %service_key, error = %e, "Configuration existence check failed");
                return Err(not_found());
            }
        }

        let value = client
            .get_configuration()
            .await
            .map_err(|e| GatewayError::ReadFailed(e.to_string()))?;

        ConfigurationTree::try_from(value).map_err(|e| {
            if let GatewayError::TypeCheck { expected, actual } = &e {
                error!(
                    service_key = %service_key,
                    expected = *expected,
                    actual = *actual,
                    "Configuration from store has unexpected shape"
                );
            }
            e
        })
    }
}
