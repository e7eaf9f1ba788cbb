//! In-memory emulation of the file-storage API for tests and local runs.
//!
//! Serves `/api/v1/fs` and `/api/v1/fs-content` with the same paths, status
//! codes and error header as the real service. All state lives in a single
//! map keyed by decoded cloud path.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const VENDOR_ERROR_CODE_HEADER: &str = "X-Mashery-Error-Code";
pub const INVALID_TOKEN_CODE: &str = "ERR_401_INVALID_TOKEN";
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Folders that exist from the start and cannot hold uploads directly.
const ROOT_FOLDERS: &[&str] = &["/Shared", "/Private"];

#[derive(Clone, Debug)]
pub enum Entry {
    File {
        bytes: Bytes,
        checksum: String,
        entry_id: String,
        group_id: String,
    },
    Folder {
        folder_id: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub checksum: String,
    pub entry_id: String,
    pub group_id: String,
}

#[derive(Deserialize)]
pub struct FolderAction {
    pub action: String,
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl AppState {
    pub fn new(token: impl Into<String>) -> Self {
        let entries = ROOT_FOLDERS
            .iter()
            .map(|path| {
                (
                    path.to_string(),
                    Entry::Folder {
                        folder_id: Uuid::new_v4().to_string(),
                    },
                )
            })
            .collect();
        Self {
            token: Arc::from(token.into()),
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

pub fn app(token: impl Into<String>) -> Router {
    Router::new()
        .route("/api/v1/fs-content/{*path}", get(download).post(upload))
        .route("/api/v1/fs/{*path}", get(metadata).post(create_folder))
        // Oversized uploads must reach the handler so it can answer 400.
        .layer(DefaultBodyLimit::disable())
        .with_state(AppState::new(token))
}

pub async fn run(listener: TcpListener, token: impl Into<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

/// Inverse of the client's segment encoding: `+` is a space, `%XX` a byte.
pub fn decode_path(encoded: &str) -> String {
    encoded
        .split('/')
        .map(|segment| {
            let spaced = segment.replace('+', " ");
            percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Decoded cloud path following `prefix` in the request URI, always
/// starting with `/` and without a trailing `/`.
fn cloud_path(uri: &Uri, prefix: &str) -> String {
    let raw = uri.path().strip_prefix(prefix).unwrap_or_default();
    let decoded = decode_path(raw);
    let trimmed = decoded.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("/", path),
    }
}

fn is_folder(entries: &HashMap<String, Entry>, path: &str) -> bool {
    matches!(entries.get(path), Some(Entry::Folder { .. }))
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "errorMessage": message }))).into_response()
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", state.token);
    let presented = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    if presented == Some(expected.as_str()) {
        return Ok(());
    }
    let mut response = api_error(StatusCode::UNAUTHORIZED, "Developer Inactive");
    response.headers_mut().insert(
        VENDOR_ERROR_CODE_HEADER,
        HeaderValue::from_static(INVALID_TOKEN_CODE),
    );
    Err(response)
}

async fn upload(State(state): State<AppState>, headers: HeaderMap, uri: Uri, body: Bytes) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    let path = cloud_path(&uri, "/api/v1/fs-content");
    let (parent, name) = split_parent(&path);
    if parent == "/" || ROOT_FOLDERS.contains(&parent) {
        return api_error(StatusCode::FORBIDDEN, "Uploads are not allowed in this folder");
    }
    if name.is_empty() || name.ends_with(".tmp") || body.len() > MAX_UPLOAD_BYTES {
        return api_error(StatusCode::BAD_REQUEST, "File rejected");
    }

    let mut entries = state.entries.write().await;
    if !is_folder(&entries, parent) {
        return api_error(StatusCode::NOT_FOUND, "Parent folder not found");
    }
    if let Some(Entry::Folder { .. }) = entries.get(&path) {
        return api_error(StatusCode::BAD_REQUEST, "A folder exists at this path");
    }
    let receipt = UploadReceipt {
        checksum: format!("{:x}", Sha512::digest(&body)),
        entry_id: Uuid::new_v4().to_string(),
        group_id: Uuid::new_v4().to_string(),
    };
    info!(%path, bytes = body.len(), entry_id = %receipt.entry_id, "stored upload");
    entries.insert(
        path,
        Entry::File {
            bytes: body,
            checksum: receipt.checksum.clone(),
            entry_id: receipt.entry_id.clone(),
            group_id: receipt.group_id.clone(),
        },
    );
    (StatusCode::OK, Json(receipt)).into_response()
}

async fn download(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    let raw = uri.path().strip_prefix("/api/v1/fs-content").unwrap_or_default();
    let entries = state.entries.read().await;

    let found = match raw.strip_prefix("/ids/file/") {
        Some(id) => entries.values().find_map(|entry| match entry {
            Entry::File { bytes, entry_id, .. } if entry_id == id => Some(bytes.clone()),
            _ => None,
        }),
        None => match entries.get(&cloud_path(&uri, "/api/v1/fs-content")) {
            Some(Entry::File { bytes, .. }) => Some(bytes.clone()),
            _ => None,
        },
    };

    match found {
        Some(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response(),
        None => api_error(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn metadata(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    let path = cloud_path(&uri, "/api/v1/fs");
    let entries = state.entries.read().await;
    let (_, name) = split_parent(&path);
    let body = match entries.get(&path) {
        Some(Entry::File {
            bytes,
            checksum,
            entry_id,
            group_id,
        }) => serde_json::json!({
            "is_folder": false,
            "name": name,
            "path": path,
            "size": bytes.len(),
            "checksum": checksum,
            "entry_id": entry_id,
            "group_id": group_id,
        }),
        Some(Entry::Folder { folder_id }) => serde_json::json!({
            "is_folder": true,
            "name": name,
            "path": path,
            "folder_id": folder_id,
        }),
        None => return api_error(StatusCode::NOT_FOUND, "Item not found"),
    };
    Json(body).into_response()
}

async fn create_folder(State(state): State<AppState>, headers: HeaderMap, uri: Uri, body: Bytes) -> Response {
    if let Err(denied) = authorize(&state, &headers) {
        return denied;
    }
    let action = match serde_json::from_slice::<FolderAction>(&body) {
        Ok(action) if action.action == "add_folder" => action,
        _ => return api_error(StatusCode::BAD_REQUEST, "Unsupported action"),
    };
    let path = cloud_path(&uri, "/api/v1/fs");
    let (parent, name) = split_parent(&path);
    if parent == "/" || name.is_empty() {
        return api_error(StatusCode::FORBIDDEN, "Cannot create folders here");
    }

    let mut entries = state.entries.write().await;
    if !is_folder(&entries, parent) {
        return api_error(StatusCode::NOT_FOUND, "Parent folder not found");
    }
    if entries.contains_key(&path) {
        return api_error(StatusCode::METHOD_NOT_ALLOWED, "Item already exists");
    }
    let folder_id = Uuid::new_v4().to_string();
    info!(%path, action = %action.action, %folder_id, "created folder");
    entries.insert(path.clone(), Entry::Folder { folder_id: folder_id.clone() });
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "path": path, "folder_id": folder_id })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_path_reverses_form_encoding() {
        assert_eq!(decode_path("/Shared/My+Folder/r%C3%A9.pdf"), "/Shared/My Folder/ré.pdf");
        assert_eq!(decode_path("/C%2B%2B+notes"), "/C++ notes");
    }

    #[test]
    fn cloud_path_normalizes_slashes() {
        let uri: Uri = "/api/v1/fs/Shared/Docs/".parse().unwrap();
        assert_eq!(cloud_path(&uri, "/api/v1/fs"), "/Shared/Docs");
    }

    #[test]
    fn split_parent_handles_top_level() {
        assert_eq!(split_parent("/Shared"), ("/", "Shared"));
        assert_eq!(split_parent("/Shared/a/b.txt"), ("/Shared/a", "b.txt"));
    }

    #[test]
    fn root_folders_exist_from_start() {
        let state = AppState::new("t");
        let entries = state.entries.try_read().unwrap();
        assert!(matches!(entries.get("/Shared"), Some(Entry::Folder { .. })));
        assert!(matches!(entries.get("/Private"), Some(Entry::Folder { .. })));
    }

    #[test]
    fn is_folder_ignores_files_and_missing_paths() {
        let state = AppState::new("t");
        let mut entries = state.entries.try_write().unwrap();
        entries.insert(
            "/Shared/a.txt".to_string(),
            Entry::File {
                bytes: Bytes::from_static(b"a"),
                checksum: String::new(),
                entry_id: "e".to_string(),
                group_id: "g".to_string(),
            },
        );
        assert!(is_folder(&entries, "/Shared"));
        assert!(!is_folder(&entries, "/Shared/a.txt"));
        assert!(!is_folder(&entries, "/Shared/Drafts"));
    }

    #[test]
    fn upload_receipt_serializes() {
        let receipt = UploadReceipt {
            checksum: "abc".to_string(),
            entry_id: "e".to_string(),
            group_id: "g".to_string(),
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["entry_id"], "e");
    }
}
