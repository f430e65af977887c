//! Process startup: logging and the HTTP server

mod http;
mod logging;

pub use http::http_server;
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
