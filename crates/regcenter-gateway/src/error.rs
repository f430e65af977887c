// Error handling and response mapping for the gateway
// Every failure path returns to the caller immediately with a status code and
// a human-readable plain text message.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};

/// Gateway error taxonomy
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Malformed request body or path parameter
    #[error("{0}")]
    BadRequest(String),

    /// Unknown service namespace or unreachable configuration backend on read
    #[error("{0}")]
    NotFound(String),

    /// Token exchange with the registry ACL endpoint failed
    #[error("unable to get consul acl token: {message}")]
    TokenExchange { status: u16, message: String },

    /// Backend client could not be constructed
    #[error("connection to Registry could not be made: {0}")]
    Connection(String),

    /// Backend reachable at the transport level but not serving
    #[error("registry ({0}) is not running")]
    NotRunning(String),

    /// Bulk configuration write rejected or failed upstream
    #[error("{0}")]
    WriteFailed(String),

    #[error("could not get configuration from Configuration: {0}")]
    ReadFailed(String),

    /// Backend returned a value whose shape does not match the contract
    #[error("Configuration from Registry failed type check")]
    TypeCheck { expected: &'static str, actual: &'static str },

    #[error("{0}")]
    RegistryUnavailable(String),

    #[error("{0}")]
    Registry(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// On reads, a configuration backend that cannot be reached means the
    /// service's configuration cannot be found
    pub fn into_not_found(self) -> Self {
        match self {
            GatewayError::Connection(_) | GatewayError::NotRunning(_) => {
                GatewayError::NotFound(self.to_string())
            }
            other => other,
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            // Only error statuses pass through; anything else from the token
            // endpoint is an upstream fault
            GatewayError::TokenExchange { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            GatewayError::WriteFailed(_) => StatusCode::BAD_GATEWAY,
            GatewayError::RegistryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Connection(_)
            | GatewayError::NotRunning(_)
            | GatewayError::ReadFailed(_)
            | GatewayError::TypeCheck { .. }
            | GatewayError::Registry(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}
