//! Service configuration API
//!
//! `GET /config/{servicekey}` returns the stored tree, `POST` and `PUT`
//! replace it with the JSON object in the request body.

use actix_web::{HttpRequest, HttpResponse, Scope, get, route, web};

use crate::auth::extract_token;
use crate::error::GatewayError;
use crate::model::{ConfigurationTree, ServiceKey};
use crate::state::AppState;

/// Largest configuration body accepted on write
pub const MAX_CONFIG_BODY_BYTES: usize = 4 * 1024 * 1024;

const JSON_UTF8: &str = "application/json;charset=UTF-8";

#[get("/{servicekey}")]
async fn get_config(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let service_key = ServiceKey::new(path.into_inner())?;
    let token = extract_token(&req);

    let tree = data
        .config_service
        .read(&service_key, token.as_deref())
        .await?;
    let body = serde_json::to_vec(&tree).map_err(|e| GatewayError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().content_type(JSON_UTF8).body(body))
}

#[route("/{servicekey}", method = "POST", method = "PUT")]
async fn put_config(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let service_key = ServiceKey::new(path.into_inner())?;
    let tree = ConfigurationTree::from_slice(&body)?;
    let token = extract_token(&req);

    data.config_service
        .write(&service_key, token.as_deref(), tree)
        .await?;

    Ok(HttpResponse::Ok().finish())
}

pub fn routes() -> Scope {
    web::scope("/config")
        .app_data(web::PayloadConfig::new(MAX_CONFIG_BODY_BYTES))
        .service(get_config)
        .service(put_config)
}
