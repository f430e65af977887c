//! Bearer credential injection for outbound backend requests

use std::fmt;

use reqwest::RequestBuilder;

/// Attaches a bearer credential to every request a backend client sends.
///
/// An injector without a token leaves requests untouched, which is what the
/// gateway uses when security is disabled.
#[derive(Clone, Default)]
pub struct AuthInjector {
    token: Option<String>,
}

impl AuthInjector {
    /// Injector that adds no credentials
    pub fn none() -> Self {
        Self { token: None }
    }

    /// Injector that presents `token` as `Authorization: Bearer <token>`
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    pub fn inject(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl fmt::Debug for AuthInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = self.token.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthInjector").field("token", &token).finish()
    }
}
