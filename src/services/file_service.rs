use std::path::Path;
use tokio::fs;

use crate::{
    error::{AppError, Result},
    models::*,
    security,
    state::AppState,
    tree::{FileId, FileNode, FolderId, ROOT_FOLDER_ID},
};

/// An open blob together with the metadata needed to serve it.
#[derive(Debug)]
pub struct Download {
    pub file: FileNode,
    pub blob: fs::File,
}

pub struct FileService;

impl FileService {
    /// Store an uploaded file in `dest` (root when `None`)
    pub async fn upload(
        state: &AppState,
        dest: Option<FolderId>,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<FileId> {
        let name = security::sanitize_upload_filename(filename).map_err(AppError::InvalidInput)?;

        if !state.config.is_extension_allowed(Path::new(&name)) {
            return Err(AppError::PermissionDenied(format!(
                "File extension not allowed: {:?}",
                Path::new(&name).extension()
            )));
        }

        if content.len() > state.config.max_upload_size {
            return Err(AppError::FileTooLarge(
                content.len(),
                state.config.max_upload_size,
            ));
        }

        let parent_id = dest.unwrap_or(ROOT_FOLDER_ID);
        let id = {
            let mut tree = state.tree.write().await;
            tree.folder(parent_id)?;
            tree.reserve_file_id()
        };

        // The blob goes to disk before the metadata becomes visible, so a
        // listed file can always be downloaded.
        state.blobs.write(id, &content).await?;

        let node = FileNode {
            id,
            name,
            parent_id,
            size: content.len() as u64,
            checksum: security::calculate_checksum(&content),
        };

        // The destination may have vanished while the blob was being written,
        // or the snapshot save failed. Either way the file is not listed.
        if let Err(err) = state.update_tree(|tree| tree.insert_file(node)).await {
            if let Err(cleanup) = state.blobs.remove(id).await {
                tracing::warn!(file_id = id, "Failed to remove orphan blob: {}", cleanup);
            }
            return Err(err);
        }

        tracing::info!(file_id = id, parent_id, size = content.len(), "File uploaded");
        Ok(id)
    }

    pub async fn get_file(state: &AppState, file_id: FileId) -> Result<FileResponse> {
        let tree = state.tree.read().await;
        Ok(FileResponse::from(tree.file(file_id)?))
    }

    pub async fn open_download(state: &AppState, file_id: FileId) -> Result<Download> {
        let file = state.tree.read().await.file(file_id)?.clone();
        // A concurrent delete surfaces here as a NotFound IO error.
        let blob = state.blobs.open_blob(file_id).await?;

        tracing::debug!(file_id, name = %file.name, "Serving file");
        Ok(Download { file, blob })
    }

    pub async fn move_file(state: &AppState, file_id: FileId, dest: FolderId) -> Result<()> {
        state
            .update_tree(|tree| tree.move_file(file_id, dest))
            .await?;

        tracing::info!(file_id, dest, "File moved");
        Ok(())
    }

    pub async fn update_file(
        state: &AppState,
        file_id: FileId,
        request: UpdateFileRequest,
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
                tree.file(file_id)?;
                if let Some(dest) = request.parent_id {
                    tree.move_file(file_id, dest)?;
                }
                if let Some(name) = &request.name {
                    tree.rename_file(file_id, name)?;
                }
                Ok(())
            })
            .await?;

        tracing::info!(file_id, "File updated");
        Ok(())
    }

    pub async fn delete_file(state: &AppState, file_id: FileId) -> Result<()> {
        state
            .update_tree(|tree| tree.delete_file(file_id))
            .await?;

        if let Err(err) = state.blobs.remove(file_id).await {
            tracing::warn!(file_id, "Failed to remove blob: {}", err);
        }

        tracing::info!(file_id, "File deleted");
        Ok(())
    }
}
