use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::tree::{FileId, FileNode, FolderId, FolderNode};

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

/// Partial update: omitted (or null) fields stay unchanged.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    #[validate(length(min = 1, max = 255))]
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    #[validate(length(min = 1, max = 255))]
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

#[derive(Debug, Deserialize)]
pub struct DestQuery {
    pub dest: FolderId,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub dest: Option<FolderId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
}

impl From<&FolderNode> for FolderInfo {
    fn from(node: &FolderNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            parent_id: node.parent_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: FileId,
    pub name: String,
}

impl From<&FileNode> for FileEntry {
    fn from(node: &FileNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderContentResponse {
    pub current_folder: Option<FolderInfo>,
    pub folders: Vec<FolderInfo>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: FileId,
    pub name: String,
    pub parent_id: FolderId,
    pub size: u64,
    pub checksum: String,
}

impl From<&FileNode> for FileResponse {
    fn from(node: &FileNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            parent_id: node.parent_id,
            size: node.size,
            checksum: node.checksum.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub folders: usize,
    pub files: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_folder_request_validation() {
        let valid_request = CreateFolderRequest {
            name: "Folder 1".to_string(),
            parent_id: None,
        };
        assert!(valid_request.validate().is_ok());

        let invalid_request = CreateFolderRequest {
            name: "".to_string(),
            parent_id: Some(0),
        };
        assert!(invalid_request.validate().is_err());
    }

    #[test]
    fn test_create_folder_request_wire_format() {
        let request: CreateFolderRequest =
            serde_json::from_str(r#"{"name":"Folder 1","parentId":0}"#).unwrap();
        assert_eq!(request.parent_id, Some(0));

        let request: CreateFolderRequest = serde_json::from_str(r#"{"name":"Folder 1"}"#).unwrap();
        assert_eq!(request.parent_id, None);
    }

    #[test]
    fn test_update_folder_request_is_partial() {
        let request: UpdateFolderRequest =
            serde_json::from_str(r#"{"name":"Root folder new name"}"#).unwrap();
        assert_eq!(request.name.as_deref(), Some("Root folder new name"));
        assert_eq!(request.parent_id, None);
        assert!(request.validate().is_ok());

        let request = UpdateFolderRequest {
            name: Some(String::new()),
            parent_id: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_folder_content_serializes_camel_case() {
        let content = FolderContentResponse {
            current_folder: None,
            folders: vec![FolderInfo {
                id: 1,
                name: "Photos".to_string(),
                parent_id: Some(0),
            }],
            files: vec![],
        };

        let value = serde_json::to_value(&content).unwrap();
        assert!(value["currentFolder"].is_null());
        assert_eq!(value["folders"][0]["parentId"], 0);
        assert_eq!(value["files"], serde_json::json!([]));
    }
}
