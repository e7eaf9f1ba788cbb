//! Response wrapper with uniform error information.
//!
//! # Design
//! Every call returns an `ApiResponse`, success or not. A status of 400 or
//! above marks an API error, and the caller decides what to do with it.
//! Human-readable status text comes from an `ErrorMap`: the default table
//! below with the endpoint's own messages laid over it.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::HttpResponse;

/// Header the API gateway uses to report its own error identifier.
pub const VENDOR_ERROR_CODE_HEADER: &str = "X-Mashery-Error-Code";

/// Status text used when neither the endpoint nor the defaults know a code.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

const DEFAULT_MESSAGES: &[(u16, &str)] = &[
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (415, "Unsupported Media Type"),
    (500, "Internal Server Error"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (596, "Service Not Found"),
];

/// Status code to message table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMap {
    messages: BTreeMap<u16, Cow<'static, str>>,
}

impl ErrorMap {
    /// The table shared by every endpoint.
    pub fn defaults() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|&(code, text)| (code, Cow::Borrowed(text)))
                .collect(),
        }
    }

    /// Defaults with `overrides` laid on top. An override replaces the
    /// default text for the same code.
    pub fn with_overrides<I, S>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<Cow<'static, str>>,
    {
        let mut map = Self::defaults();
        for (code, text) in overrides {
            map.messages.insert(code, text.into());
        }
        map
    }

    /// Message for `status`, or `"Unknown Error"`.
    pub fn message(&self, status: u16) -> &str {
        self.messages
            .get(&status)
            .map(|text| text.as_ref())
            .unwrap_or(UNKNOWN_ERROR)
    }
}

impl Default for ErrorMap {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Read-only description of a failed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub raw_body: Vec<u8>,
    /// Best-effort JSON decoding of `raw_body`.
    pub json_body: Option<Value>,
    pub status_code: u16,
    pub status_code_text: String,
    /// Passthrough of the gateway's error code header, when present.
    pub api_exception_code: Option<String>,
}

impl ErrorDetails {
    pub fn raw_body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_body)
    }
}

/// One API response: the raw transport result plus the error table for the
/// endpoint that produced it.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    raw: HttpResponse,
    errors: ErrorMap,
}

impl ApiResponse {
    pub fn new(raw: HttpResponse, errors: ErrorMap) -> Self {
        Self { raw, errors }
    }

    pub fn status(&self) -> u16 {
        self.raw.status
    }

    pub fn body(&self) -> &[u8] {
        &self.raw.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.raw.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn raw(&self) -> &HttpResponse {
        &self.raw
    }

    pub fn error_map(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn is_error(&self) -> bool {
        self.raw.status >= 400
    }

    /// The body parsed as JSON. `None` when the body is empty, not JSON, or
    /// the JSON literal `null`.
    pub fn decoded_json(&self) -> Option<Value> {
        match serde_json::from_slice(&self.raw.body) {
            Ok(Value::Null) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }

    /// The body parsed into `T`, or `None` when it does not fit.
    pub fn decoded_json_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(&self.raw.body).ok()
    }

    /// Details on a failed request.
    ///
    /// Returns `ClientError::NoErrorDetails` when the response is not an
    /// error; check `is_error()` first.
    pub fn error_details(&self) -> Result<ErrorDetails, ClientError> {
        if !self.is_error() {
            return Err(ClientError::NoErrorDetails {
                status: self.raw.status,
            });
        }
        Ok(ErrorDetails {
            raw_body: self.raw.body.clone(),
            json_body: self.decoded_json(),
            status_code: self.raw.status,
            status_code_text: self.errors.message(self.raw.status).to_string(),
            api_exception_code: self.header(VENDOR_ERROR_CODE_HEADER).map(str::to_string),
        })
    }
}
