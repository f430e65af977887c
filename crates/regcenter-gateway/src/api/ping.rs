//! Gateway self ping, also the health-check route used on self-registration

use actix_web::{HttpResponse, Scope, get, web};
use serde::Serialize;

use crate::state::AppState;

pub const API_VERSION: &str = "v3";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub api_version: String,
    pub timestamp: String,
    pub service_name: String,
}

#[get("/ping")]
async fn ping(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(PingResponse {
        api_version: API_VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc2822(),
        service_name: data.config.service.key.clone(),
    })
}

pub fn routes() -> Scope {
    web::scope("/api/v3").service(ping)
}
