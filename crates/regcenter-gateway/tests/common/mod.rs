//! In-memory backends and app builders shared by the API tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Map, Value};

use regcenter_client::error::Result as ClientResult;
use regcenter_client::{
    BackendEndpointConfig, ClientError, ConfigStoreClient, RegistryClient, RegistryClientConfig,
    ServiceEndpoint,
};
use regcenter_gateway::api::route;
use regcenter_gateway::{AppState, ClientConnector, GatewayConfig};

/// Shared state behind every mock client the connector hands out
pub struct MockBackend {
    /// Stored trees keyed by configuration base path
    pub trees: Mutex<HashMap<String, Map<String, Value>>>,
    pub store_alive: AtomicBool,
    pub registry_alive: AtomicBool,
    pub endpoints: Mutex<Vec<ServiceEndpoint>>,
    /// Construction fails with this message when set
    pub construction_error: Mutex<Option<String>>,
    pub write_error: Mutex<Option<String>>,
    pub existence_error: Mutex<Option<String>>,
    pub list_error: Mutex<Option<String>>,
    /// Returned by `get_configuration` instead of the stored tree when set
    pub raw_read: Mutex<Option<Value>>,
    pub store_configs: Mutex<Vec<BackendEndpointConfig>>,
    pub registry_configs: Mutex<Vec<RegistryClientConfig>>,
    pub registered: Mutex<Vec<String>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            trees: Mutex::new(HashMap::new()),
            store_alive: AtomicBool::new(true),
            registry_alive: AtomicBool::new(true),
            endpoints: Mutex::new(Vec::new()),
            construction_error: Mutex::new(None),
            write_error: Mutex::new(None),
            existence_error: Mutex::new(None),
            list_error: Mutex::new(None),
            raw_read: Mutex::new(None),
            store_configs: Mutex::new(Vec::new()),
            registry_configs: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
        }
    }
}

impl MockBackend {
    pub fn fail_construction(&self, message: &str) {
        *self.construction_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_store_alive(&self, alive: bool) {
        self.store_alive.store(alive, Ordering::SeqCst);
    }

    pub fn set_registry_alive(&self, alive: bool) {
        self.registry_alive.store(alive, Ordering::SeqCst);
    }

    pub fn tree(&self, base_path: &str) -> Option<Map<String, Value>> {
        self.trees.lock().unwrap().get(base_path).cloned()
    }

    fn check_construction(&self) -> ClientResult<()> {
        match self.construction_error.lock().unwrap().clone() {
            Some(message) => Err(ClientError::InvalidConfig(message)),
            None => Ok(()),
        }
    }
}

fn injected(message: &Mutex<Option<String>>) -> ClientResult<()> {
    match message.lock().unwrap().clone() {
        Some(body) => Err(ClientError::RequestFailed { status: 500, body }),
        None => Ok(()),
    }
}

pub struct MockStore {
    backend: Arc<MockBackend>,
    base_path: String,
}

#[async_trait]
impl ConfigStoreClient for MockStore {
    async fn has_configuration(&self) -> ClientResult<bool> {
        injected(&self.backend.existence_error)?;
        Ok(self
            .backend
            .tree(&self.base_path)
            .is_some_and(|tree| !tree.is_empty()))
    }

    async fn get_configuration(&self) -> ClientResult<Value> {
        if let Some(raw) = self.backend.raw_read.lock().unwrap().clone() {
            return Ok(raw);
        }
        Ok(Value::Object(self.backend.tree(&self.base_path).unwrap_or_default()))
    }

    async fn put_configuration_map(
        &self,
        configuration: &Map<String, Value>,
        overwrite: bool,
    ) -> ClientResult<()> {
        injected(&self.backend.write_error)?;
        let mut trees = self.backend.trees.lock().unwrap();
        let entry = trees.entry(self.base_path.clone()).or_default();
        for (key, value) in configuration {
            if overwrite || !entry.contains_key(key) {
                entry.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.backend.store_alive.load(Ordering::SeqCst)
    }
}

pub struct MockRegistry {
    backend: Arc<MockBackend>,
    service_key: String,
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn register(&self) -> ClientResult<()> {
        self.backend
            .registered
            .lock()
            .unwrap()
            .push(self.service_key.clone());
        Ok(())
    }

    async fn unregister(&self) -> ClientResult<()> {
        self.backend
            .registered
            .lock()
            .unwrap()
            .retain(|key| key != &self.service_key);
        Ok(())
    }

    async fn get_all_service_endpoints(&self) -> ClientResult<Vec<ServiceEndpoint>> {
        injected(&self.backend.list_error)?;
        Ok(self.backend.endpoints.lock().unwrap().clone())
    }

    async fn is_alive(&self) -> bool {
        self.backend.registry_alive.load(Ordering::SeqCst)
    }
}

pub struct MockConnector(pub Arc<MockBackend>);

impl ClientConnector for MockConnector {
    fn config_store(
        &self,
        config: BackendEndpointConfig,
    ) -> ClientResult<Box<dyn ConfigStoreClient>> {
        self.0.check_construction()?;
        let base_path = config.base_path.clone();
        self.0.store_configs.lock().unwrap().push(config);
        Ok(Box::new(MockStore {
            backend: self.0.clone(),
            base_path,
        }))
    }

    fn registry(&self, config: RegistryClientConfig) -> ClientResult<Box<dyn RegistryClient>> {
        self.0.check_construction()?;
        let service_key = config.service_key.clone();
        self.0.registry_configs.lock().unwrap().push(config);
        Ok(Box::new(MockRegistry {
            backend: self.0.clone(),
            service_key,
        }))
    }
}

pub fn endpoint(service_id: &str, host: &str, port: u16) -> ServiceEndpoint {
    ServiceEndpoint {
        service_id: service_id.to_string(),
        host: host.to_string(),
        port,
        healthy: None,
    }
}

pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.registry.host = "consul.test".to_string();
    config.registry.port = 8500;
    config.service.key = "regcenter-gateway".to_string();
    config
}

pub fn app_state(config: GatewayConfig, connector: Arc<dyn ClientConnector>) -> AppState {
    AppState::new(Arc::new(config), connector)
}

pub async fn create_test_app(
    state: AppState,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(route::configure),
    )
    .await
}

/// App backed by a fresh in-memory backend with security disabled
pub async fn create_mock_app() -> (
    Arc<MockBackend>,
    impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) {
    let backend = Arc::new(MockBackend::default());
    let state = app_state(test_config(), Arc::new(MockConnector(backend.clone())));
    (backend, create_test_app(state).await)
}
