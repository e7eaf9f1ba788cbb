//! Blocking `HttpTransport` backed by ureq.

use tracing::trace;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// ureq agent configured so 4xx/5xx come back as responses rather than
/// `Err`, leaving status interpretation to `ApiResponse`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(config.accepts_invalid_certs())
            .build();
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let sent = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(&body[..]),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = sent.map_err(|e| TransportError::Request {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // Downloads are whole files; lift ureq's default in-memory cap.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransportError::Body {
                url: request.url.clone(),
                message: e.to_string(),
            })?;
        trace!(status, bytes = body.len(), "response body read");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_request() -> HttpRequest {
        // Bind then drop to get a port nothing listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("https://{addr}/api/v1/fs/Shared"),
            headers: vec![("Authorization".to_string(), "Bearer t0k3n".to_string())],
            body: None,
        }
    }

    #[test]
    fn builds_with_verification_on_and_off() {
        for accept in [false, true] {
            let config = ClientConfig::new("acme", "t0k3n").accept_invalid_certs(accept);
            let transport = UreqTransport::new(&config);
            let err = transport.execute(&unreachable_request()).unwrap_err();
            assert!(
                matches!(err, TransportError::Request { ref url, .. } if url.ends_with("/fs/Shared")),
                "accept_invalid_certs={accept}: {err}"
            );
        }
    }
}
