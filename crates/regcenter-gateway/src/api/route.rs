//! Gateway routing configuration

use actix_web::web;

use super::{config, ping, registry};

/// Mount every gateway route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(config::routes())
        .service(registry::routes())
        .service(ping::routes());
}
