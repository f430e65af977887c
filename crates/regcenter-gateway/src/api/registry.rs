use actix_web::{HttpRequest, HttpResponse, Scope, get, web};

use crate::auth::extract_token;
use crate::error::GatewayError;
use crate::state::AppState;

#[get("")]
async fn list_endpoints(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let token = extract_token(&req);
    let endpoints = data.registry_service.list_endpoints(token.as_deref()).await?;

    Ok(HttpResponse::Ok().json(endpoints))
}

#[get("/ping")]
async fn ping(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    let token = extract_token(&req);
    data.registry_service.ping(token.as_deref()).await?;

    Ok(HttpResponse::Ok().finish())
}

pub fn routes() -> Scope {
    web::scope("/registry")
        .service(list_endpoints)
        .service(ping)
}
