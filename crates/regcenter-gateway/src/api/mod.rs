//! HTTP API of the gateway

pub mod config;
pub mod ping;
pub mod registry;
pub mod route;
