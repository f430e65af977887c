//! Per-request operations against the configuration store and registry

pub mod config;
pub mod registry;

pub use config::ConfigurationService;
pub use registry::RegistryService;
