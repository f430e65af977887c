//! Regcenter Client - backend SDK for the configuration store and service registry
//!
//! This crate provides:
//! - `ConfigStoreClient` and `RegistryClient` traits the gateway programs against
//! - Consul KV backed configuration store client
//! - Consul agent backed registry client
//! - Bearer credential injection for every outbound backend request

pub mod auth;
pub mod config;
pub mod config_store;
pub mod error;
pub mod http;
pub mod model;
pub mod registry;

pub use auth::AuthInjector;
pub use config::{BackendEndpointConfig, CONSUL_TYPE, RegistryClientConfig};
pub use config_store::{ConfigStoreClient, ConsulConfigClient};
pub use error::ClientError;
pub use model::ServiceEndpoint;
pub use registry::{ConsulRegistryClient, RegistryClient};
