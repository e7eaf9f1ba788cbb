//! Client configuration.

use std::fmt;

use serde::Deserialize;

/// Connection settings for one storage domain.
///
/// Can be built in code or deserialized from the host application's own
/// configuration (`domain`, `auth_token`, optional `base_url` and
/// `accept_invalid_certs`).
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    domain: String,
    auth_token: String,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(domain: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            auth_token: auth_token.into(),
            base_url: None,
            accept_invalid_certs: false,
        }
    }

    /// Send requests to `base_url` instead of the domain's public endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Skip TLS certificate verification.
    ///
    /// **Unsafe**: any party on the network path can impersonate the server
    /// and read the bearer token. Only meant for test setups with
    /// self-signed certificates.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// `https://{domain}.example.com/api/v1` unless overridden. Never ends
    /// with `/`.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.example.com/api/v1", self.domain),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("domain", &self.domain)
            .field("auth_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
