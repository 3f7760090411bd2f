use crate::{
    error::{AppError, Result},
    models::*,
    security,
    state::AppState,
    tree::{FolderId, ROOT_FOLDER_ID},
};

pub struct FolderService;

impl FolderService {
    /// Content of `folder_id`, or of the root when `None`.
    pub async fn get_content(
        state: &AppState,
        folder_id: Option<FolderId>,
    ) -> Result<FolderContentResponse> {
        let tree = state.tree.read().await;
        let children = tree.children(folder_id.unwrap_or(ROOT_FOLDER_ID))?;

        let current_folder = match folder_id {
            None if !state.config.root_listing_current_folder => None,
            _ => Some(FolderInfo::from(children.folder)),
        };

        Ok(FolderContentResponse {
            current_folder,
            folders: children.folders.into_iter().map(FolderInfo::from).collect(),
            files: children.files.into_iter().map(FileEntry::from).collect(),
        })
    }

    pub async fn create_folder(state: &AppState, request: CreateFolderRequest) -> Result<FolderId> {
        security::validate_name(&request.name).map_err(AppError::InvalidInput)?;

        let id = state
            .update_tree(|tree| tree.create_folder(&request.name, request.parent_id))
            .await?;

        tracing::info!(folder_id = id, parent_id = ?request.parent_id, "Folder created");
        Ok(id)
    }

    pub async fn update_folder(
        state: &AppState,
        folder_id: FolderId,
        request: UpdateFolderRequest,
    ) -> Result<()> {
        if request.name.is_none() && request.parent_id.is_none() {
            return Err(AppError::InvalidInput(
                "Nothing to update: provide 'name' and/or 'parentId'".to_string(),
            ));
        }
        if let Some(name) = &request.name {
            security::validate_name(name).map_err(AppError::InvalidInput)?;
        }

        state
            .update_tree(|tree| {
                tree.folder(folder_id)?;
                if let Some(dest) = request.parent_id {
                    tree.move_folder(folder_id, dest)?;
                }
                if let Some(name) = &request.name {
                    tree.rename_folder(folder_id, name)?;
                }
                Ok(())
            })
            .await?;

        tracing::info!(folder_id, "Folder updated");
        Ok(())
    }

    pub async fn move_folder(state: &AppState, folder_id: FolderId, dest: FolderId) -> Result<()> {
        state
            .update_tree(|tree| tree.move_folder(folder_id, dest))
            .await?;

        tracing::info!(folder_id, dest, "Folder moved");
        Ok(())
    }

    /// Deletes the folder with everything below it, then drops the blobs of
    /// the removed files.
    pub async fn delete_folder(state: &AppState, folder_id: FolderId) -> Result<()> {
        let removed = state
            .update_tree(|tree| tree.delete_folder(folder_id))
            .await?;

        tracing::info!(
            folder_id,
            folders = removed.folders.len(),
            files = removed.files.len(),
            "Folder deleted"
        );

        for file in &removed.files {
            if let Err(err) = state.blobs.remove(file.id).await {
                tracing::warn!(file_id = file.id, "Failed to remove blob: {}", err);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::FileService;
    use tempfile::TempDir;

    async fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage_dir = temp_dir.path().to_path_buf();
        let state = AppState::open(config).await.unwrap();
        (state, temp_dir)
    }

    fn create_request(name: &str, parent_id: Option<FolderId>) -> CreateFolderRequest {
        CreateFolderRequest {
            name: name.to_string(),
            parent_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_folder() {
        let (state, _temp_dir) = create_test_state().await;

        let id = FolderService::create_folder(&state, create_request("Folder 1", None))
            .await
            .unwrap();

        let root = FolderService::get_content(&state, None).await.unwrap();
        assert_eq!(root.current_folder.as_ref().map(|f| f.id), Some(ROOT_FOLDER_ID));
        assert_eq!(root.folders.len(), 1);
        assert_eq!(root.folders[0].id, id);
        assert_eq!(root.folders[0].name, "Folder 1");
    }

    #[tokio::test]
    async fn test_root_listing_without_current_folder() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage_dir = temp_dir.path().to_path_buf();
        config.root_listing_current_folder = false;
        let state = AppState::open(config).await.unwrap();

        let root = FolderService::get_content(&state, None).await.unwrap();
        assert!(root.current_folder.is_none());

        // Asking for the root by id still describes it.
        let root = FolderService::get_content(&state, Some(ROOT_FOLDER_ID)).await.unwrap();
        assert!(root.current_folder.is_some());
    }

    #[tokio::test]
    async fn test_get_unknown_folder() {
        let (state, _temp_dir) = create_test_state().await;
        let result = FolderService::get_content(&state, Some(123456)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_folder_rejects_bad_input() {
        let (state, _temp_dir) = create_test_state().await;

        let result = FolderService::create_folder(&state, create_request("a/b", None)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let result = FolderService::create_folder(&state, create_request("x", Some(99))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_folder_partial() {
        let (state, _temp_dir) = create_test_state().await;
        let a = FolderService::create_folder(&state, create_request("a", None))
            .await
            .unwrap();
        let b = FolderService::create_folder(&state, create_request("b", None))
            .await
            .unwrap();

        let rename = UpdateFolderRequest {
            name: Some("Root folder new name".to_string()),
            parent_id: None,
        };
        FolderService::update_folder(&state, ROOT_FOLDER_ID, rename)
            .await
            .unwrap();

        let reparent = UpdateFolderRequest {
            name: None,
            parent_id: Some(a),
        };
        FolderService::update_folder(&state, b, reparent).await.unwrap();

        let root = FolderService::get_content(&state, None).await.unwrap();
        assert_eq!(root.current_folder.unwrap().name, "Root folder new name");
        let inside_a = FolderService::get_content(&state, Some(a)).await.unwrap();
        assert_eq!(inside_a.folders[0].id, b);
        assert_eq!(inside_a.folders[0].name, "b");

        let empty = FolderService::update_folder(&state, a, UpdateFolderRequest::default()).await;
        assert!(matches!(empty, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_rejected_reparent_keeps_name() {
        let (state, _temp_dir) = create_test_state().await;
        let a = FolderService::create_folder(&state, create_request("a", None))
            .await
            .unwrap();

        let request = UpdateFolderRequest {
            name: Some("renamed".to_string()),
            parent_id: Some(a),
        };
        let result = FolderService::update_folder(&state, a, request).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let content = FolderService::get_content(&state, Some(a)).await.unwrap();
        assert_eq!(content.current_folder.unwrap().name, "a");
    }

    #[tokio::test]
    async fn test_move_root_is_invalid_operation() {
        let (state, _temp_dir) = create_test_state().await;
        let a = FolderService::create_folder(&state, create_request("a", None))
            .await
            .unwrap();

        let result = FolderService::move_folder(&state, ROOT_FOLDER_ID, a).await;
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_delete_folder_removes_blobs() {
        let (state, _temp_dir) = create_test_state().await;
        let a = FolderService::create_folder(&state, create_request("a", None))
            .await
            .unwrap();
        let b = FolderService::create_folder(&state, create_request("b", Some(a)))
            .await
            .unwrap();
        let file_id = FileService::upload(&state, Some(b), "deep.txt", b"deep".to_vec())
            .await
            .unwrap();
        assert!(state.blobs.path(file_id).exists());

        FolderService::delete_folder(&state, a).await.unwrap();

        assert!(matches!(
            FolderService::get_content(&state, Some(b)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            FileService::get_file(&state, file_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(!state.blobs.path(file_id).exists());

        let root = FolderService::delete_folder(&state, ROOT_FOLDER_ID).await;
        assert!(matches!(root, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_rolls_back_delete() {
        let (state, temp_dir) = create_test_state().await;
        let a = FolderService::create_folder(&state, create_request("a", None))
            .await
            .unwrap();
        let file_id = FileService::upload(&state, Some(a), "kept.txt", b"kept".to_vec())
            .await
            .unwrap();

        std::fs::create_dir(temp_dir.path().join("index.json.tmp")).unwrap();

        let result = FolderService::delete_folder(&state, a).await;
        assert!(matches!(result, Err(AppError::IoError(_))));

        // The folder, its file and the blob are all still there.
        let content = FolderService::get_content(&state, Some(a)).await.unwrap();
        assert_eq!(content.files[0].id, file_id);
        assert!(state.blobs.path(file_id).exists());

        let result = FolderService::move_folder(&state, a, ROOT_FOLDER_ID).await;
        assert!(result.is_err());
        let result = FolderService::create_folder(&state, create_request("b", None)).await;
        assert!(result.is_err());
        let root = FolderService::get_content(&state, None).await.unwrap();
        assert_eq!(root.folders.len(), 1);
    }
}
