//! Payloads exchanged with the storage API.
//!
//! # Design
//! The mock-server crate defines its own copies of the response shapes;
//! integration tests catch drift between the two.

use serde::{Deserialize, Serialize};

/// Body of a folder-creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderAction {
    pub action: String,
}

impl FolderAction {
    pub fn add_folder() -> Self {
        Self {
            action: "add_folder".to_string(),
        }
    }
}

/// Successful upload response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    pub checksum: String,
    pub entry_id: String,
    pub group_id: String,
}

/// Metadata returned by `GET /fs/{path}`, tagged by `is_folder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryMetadata {
    File(FileMetadata),
    Folder(FolderMetadata),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub checksum: String,
    pub entry_id: String,
    pub group_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderMetadata {
    pub name: String,
    pub path: String,
    pub folder_id: String,
}

#[derive(Deserialize)]
struct Tagged {
    is_folder: bool,
    #[serde(flatten)]
    rest: serde_json::Value,
}

impl<'de> Deserialize<'de> for EntryMetadata {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = Tagged::deserialize(deserializer)?;
        let entry = if tagged.is_folder {
            serde_json::from_value(tagged.rest).map(EntryMetadata::Folder)
        } else {
            serde_json::from_value(tagged.rest).map(EntryMetadata::File)
        };
        entry.map_err(serde::de::Error::custom)
    }
}
