//! Authenticated request builder and executor for the storage API.
//!
//! # Design
//! `ApiClient` holds its configuration and a transport, and nothing else.
//! Every operation is split into a `build_*` method that produces an
//! `HttpRequest` (pure, no I/O) and an executing method that sends it once and
//! wraps the result in an `ApiResponse`. Headers are assembled from scratch
//! for each request, so one call's `Content-Type` can never leak into the
//! next and the client is safe to share across threads.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::path::encode_path;
use crate::response::{ApiResponse, ErrorMap};
use crate::types::FolderAction;

const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

const UPLOAD_ERRORS: &[(u16, &str)] = &[
    (
        400,
        "Bad request - missing parameters, file filtered out (e.g. .tmp file) or file is too large (>100 MB)",
    ),
    (401, "User not authorized"),
    (403, "Not enough permissions / forbidden file upload location"),
];

const CREATE_FOLDER_ERRORS: &[(u16, &str)] = &[
    (403, "User does not have permission to create folder"),
    (405, "A file with the same name already exists"),
];

fn error_map(overrides: &'static [(u16, &'static str)]) -> ErrorMap {
    ErrorMap::with_overrides(overrides.iter().copied())
}

/// Blocking client for one storage domain.
pub struct ApiClient {
    config: ClientConfig,
    base_url: String,
    transport: Box<dyn HttpTransport>,
}

impl ApiClient {
    /// Client for `domain` using the default transport.
    pub fn new(domain: impl Into<String>, auth_token: impl Into<String>) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::new(domain, auth_token))
    }

    /// Client for `config` using the default transport.
    ///
    /// Fails with `ClientError::TransportUnavailable` when the crate was
    /// built without the `ureq` feature.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = default_transport(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Client for `config` using a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: impl HttpTransport + 'static) -> Self {
        let base_url = config.base_url();
        Self {
            config,
            base_url,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_upload_file(&self, cloud_path: &str, file_name: &str, contents: &[u8]) -> HttpRequest {
        let path = format!("{cloud_path}{file_name}");
        self.post(&self.endpoint("/fs-content", &path), contents.to_vec(), OCTET_STREAM)
    }

    pub fn build_file_details(&self, path: &str) -> HttpRequest {
        self.get(&self.endpoint("/fs", path))
    }

    pub fn build_download(&self, path: &str) -> HttpRequest {
        self.get(&self.endpoint("/fs-content", path))
    }

    /// The id is an opaque identifier and goes into the URL verbatim.
    pub fn build_download_by_id(&self, id: &str) -> HttpRequest {
        self.get(&format!("{}/fs-content/ids/file/{id}", self.base_url))
    }

    pub fn build_create_folder(&self, parent_folder: &str, name: &str) -> Result<HttpRequest, ClientError> {
        let path = format!("{parent_folder}{name}");
        self.post_json(&self.endpoint("/fs", &path), &FolderAction::add_folder())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Upload `contents` as `cloud_path + file_name`. `cloud_path` should end
    /// with `/`.
    pub fn upload_file(&self, cloud_path: &str, file_name: &str, contents: &[u8]) -> Result<ApiResponse, ClientError> {
        let request = self.build_upload_file(cloud_path, file_name, contents);
        self.send(request, error_map(UPLOAD_ERRORS))
    }

    /// Metadata for a file or folder.
    pub fn file_details(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.build_file_details(path), ErrorMap::defaults())
    }

    /// File contents by path; the response body holds the raw bytes.
    pub fn download(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.build_download(path), ErrorMap::defaults())
    }

    /// File contents by entry id.
    pub fn download_by_id(&self, id: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.build_download_by_id(id), ErrorMap::defaults())
    }

    /// Create folder `parent_folder + name`. `parent_folder` should end
    /// with `/`.
    pub fn create_folder(&self, parent_folder: &str, name: &str) -> Result<ApiResponse, ClientError> {
        let request = self.build_create_folder(parent_folder, name)?;
        self.send(request, error_map(CREATE_FOLDER_ERRORS))
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn get(&self, url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: self.headers(None),
            body: None,
        }
    }

    fn post(&self, url: &str, body: Vec<u8>, content_type: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: self.headers(Some(content_type)),
            body: Some(body),
        }
    }

    /// Serialize `payload` and POST it as `application/json`.
    fn post_json<T: Serialize>(&self, url: &str, payload: &T) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_vec(payload)?;
        Ok(self.post(url, body, JSON))
    }

    /// Issue exactly one transport call and wrap whatever came back.
    fn send(&self, request: HttpRequest, errors: ErrorMap) -> Result<ApiResponse, ClientError> {
        debug!(
            method = %request.method,
            url = %request.url,
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "sending request"
        );
        let raw = self.transport.execute(&request)?;
        debug!(status = raw.status, url = %request.url, "received response");
        Ok(ApiResponse::new(raw, errors))
    }

    /// Fresh header set for one request.
    fn headers(&self, content_type: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.auth_token()),
        )];
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        headers
    }

    /// `{base}{prefix}{encoded path}`, inserting a `/` when the encoded path
    /// does not start with one.
    fn endpoint(&self, prefix: &str, path: &str) -> String {
        let encoded = encode_path(path);
        if encoded.starts_with('/') {
            format!("{}{prefix}{encoded}", self.base_url)
        } else {
            format!("{}{prefix}/{encoded}", self.base_url)
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "ureq")]
fn default_transport(config: &ClientConfig) -> Result<Box<dyn HttpTransport>, ClientError> {
    Ok(Box::new(crate::transport::UreqTransport::new(config)))
}

#[cfg(not(feature = "ureq"))]
fn default_transport(_config: &ClientConfig) -> Result<Box<dyn HttpTransport>, ClientError> {
    Err(ClientError::TransportUnavailable)
}
