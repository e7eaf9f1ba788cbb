//! Blocking client for a cloud file-storage REST API.
//!
//! # Overview
//! Authenticates with a bearer token and covers five endpoints: upload,
//! file metadata, download by path, download by id, and folder creation.
//! Every call returns an `ApiResponse`; statuses of 400 and above are
//! reported through `is_error()` / `error_details()` rather than as `Err`.
//!
//! # Design
//! - `ApiClient` builds each request from scratch (`build_*`) and hands it
//!   to an `HttpTransport`, so requests are deterministic and testable
//!   without a network.
//! - Cloud paths are encoded segment by segment (`path::encode_path`).
//! - `UreqTransport` is the default transport behind the `ureq` feature.
//!   TLS certificates are verified unless `ClientConfig::accept_invalid_certs`
//!   opts out.
//! - Errors (`ClientError`) are reserved for transport failures,
//!   construction without a transport, and misuse of `error_details()`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod path;
pub mod response;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use path::encode_path;
pub use response::{ApiResponse, ErrorDetails, ErrorMap};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{EntryMetadata, FileMetadata, FolderAction, FolderMetadata, UploadReceipt};
