//! Regcenter Gateway - configuration and service registry gateway
//!
//! Exposes a small HTTP surface for control-plane UIs:
//! - read and replace a service's configuration tree in the configuration store
//! - list registered service endpoints and check registry liveness
//! - optional ACL token exchange when security is enabled

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod factory;
pub mod model;
pub mod service;
pub mod startup;
pub mod state;

pub use config::{Cli, GatewayConfig};
pub use error::GatewayError;
pub use factory::{BackendClientFactory, ClientConnector, ConsulConnector};
pub use state::AppState;
