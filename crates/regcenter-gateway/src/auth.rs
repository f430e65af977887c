// Registry ACL token exchange
// Resolves the per-request auth context used to build backend clients. When
// security is enabled the caller's X-Consul-Token is exchanged for the ACL
// token's secret at the registry, either directly or through the API gateway.

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpRequest;
use actix_web::http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use regcenter_client::AuthInjector;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

// ACL Token header name
pub const X_CONSUL_TOKEN: &str = "X-Consul-Token";

/// Token self-lookup route on the registry itself
pub const ACL_TOKEN_PATH_DIRECT: &str = "/v1/acl/token/self";
/// The same route behind the API gateway's registry prefix
pub const ACL_TOKEN_PATH_PROXIED: &str = "/consul/v1/acl/token/self";

/// Extract the caller-supplied registry token from the request headers
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(X_CONSUL_TOKEN)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Credentials for exactly one backend client construction
#[derive(Debug, Default)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    /// Context for deployments with security disabled
    pub fn none() -> Self {
        Self { token: None }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Consume the context into the injector handed to one backend client
    pub fn into_injector(self) -> AuthInjector {
        match self.token {
            Some(token) => AuthInjector::bearer(token),
            None => AuthInjector::none(),
        }
    }
}

/// Network path used to reach the ACL token endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenRoute {
    /// Straight to the registry's own host and port (zero-trust deployments)
    Direct,
    /// Through the API gateway
    Proxied,
}

impl TokenRoute {
    pub fn from_config(config: &GatewayConfig) -> Self {
        if config.security.zero_trust_enabled {
            TokenRoute::Direct
        } else {
            TokenRoute::Proxied
        }
    }

    pub fn url(&self, config: &GatewayConfig) -> String {
        match self {
            TokenRoute::Direct => format!(
                "http://{}:{}{}",
                config.registry.host, config.registry.port, ACL_TOKEN_PATH_DIRECT
            ),
            TokenRoute::Proxied => format!(
                "http://{}:{}{}",
                config.api_gateway.server,
                config.api_gateway.application_port,
                ACL_TOKEN_PATH_PROXIED
            ),
        }
    }
}

/// Response of the token self-lookup endpoint
#[derive(Debug, Deserialize)]
struct AclTokenSelf {
    #[serde(rename = "SecretID")]
    secret_id: String,
}

/// Resolves an [`AuthContext`] per request
#[derive(Clone)]
pub struct AuthContextResolver {
    config: Arc<GatewayConfig>,
    /// `None` when security is disabled
    route: Option<TokenRoute>,
}

impl AuthContextResolver {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        let route = config
            .security
            .enabled
            .then(|| TokenRoute::from_config(&config));
        Self { config, route }
    }

    pub fn route(&self) -> Option<TokenRoute> {
        self.route
    }

    /// Produce the auth context for one request. Any exchange failure aborts
    /// the request; there is no retry and no fallback to the other route.
    pub async fn resolve(&self, inbound_token: Option<&str>) -> Result<AuthContext, GatewayError> {
        match self.route {
            None => Ok(AuthContext::none()),
            Some(route) => {
                let secret_id = self.exchange(route, inbound_token.unwrap_or_default()).await?;
                Ok(AuthContext::bearer(secret_id))
            }
        }
    }

    async fn exchange(&self, route: TokenRoute, inbound_token: &str) -> Result<String, GatewayError> {
        let url = route.url(&self.config);
        debug!(route = ?route, url = %url, "Exchanging registry ACL token");

        let unauthorized = |message: String| GatewayError::TokenExchange {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            message,
        };

        let timeout = Duration::from_millis(self.config.registry.timeout_ms);
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| unauthorized(e.to_string()))?;
        let request = client
            .get(&url)
            .bearer_auth(inbound_token)
            .build()
            .map_err(|e| unauthorized(e.to_string()))?;

        let response = client.execute(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "ACL token endpoint unreachable");
            GatewayError::TokenExchange {
                status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "ACL token exchange rejected");
            return Err(GatewayError::TokenExchange {
                status: status.as_u16(),
                message: format!("token endpoint returned {}: {}", status, body.trim()),
            });
        }

        let acl: AclTokenSelf = response
            .json()
            .await
            .map_err(|e| unauthorized(format!("invalid token response: {}", e)))?;

        Ok(acl.secret_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn config(enabled: bool, zero_trust: bool) -> Arc<GatewayConfig> {
        let mut config = GatewayConfig::default();
        config.registry.host = "consul.local".to_string();
        config.registry.port = 8500;
        config.api_gateway.server = "gateway.local".to_string();
        config.api_gateway.application_port = 8000;
        config.security.enabled = enabled;
        config.security.zero_trust_enabled = zero_trust;
        Arc::new(config)
    }

    #[test]
    fn test_route_selection() {
        assert_eq!(AuthContextResolver::new(config(false, true)).route(), None);
        assert_eq!(
            AuthContextResolver::new(config(true, true)).route(),
            Some(TokenRoute::Direct)
        );
        assert_eq!(
            AuthContextResolver::new(config(true, false)).route(),
            Some(TokenRoute::Proxied)
        );
    }

    #[test]
    fn test_route_urls() {
        let config = config(true, false);
        assert_eq!(
            TokenRoute::Direct.url(&config),
            "http://consul.local:8500/v1/acl/token/self"
        );
        assert_eq!(
            TokenRoute::Proxied.url(&config),
            "http://gateway.local:8000/consul/v1/acl/token/self"
        );
    }

    #[actix_web::test]
    async fn test_security_disabled_yields_empty_context() {
        let resolver = AuthContextResolver::new(config(false, false));
        let context = resolver.resolve(Some("inbound")).await.unwrap();
        assert!(!context.into_injector().is_enabled());
    }

    #[test]
    fn test_auth_context_into_injector() {
        let context = AuthContext::bearer("secret");
        assert!(context.into_injector().is_enabled());
    }

    #[test]
    fn test_extract_token() {
        let req = TestRequest::default()
            .insert_header((X_CONSUL_TOKEN, "abc-123"))
            .to_http_request();
        assert_eq!(extract_token(&req), Some("abc-123".to_string()));

        let req = TestRequest::default().to_http_request();
        assert_eq!(extract_token(&req), None);
    }
}
