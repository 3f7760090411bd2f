//! On-disk state: one blob per file id under `<storage_dir>/blobs`, plus the
//! optional `index.json` snapshot of the folder tree.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{
    error::{AppError, Result},
    tree::{FileId, FolderTree},
};

#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub async fn open(storage_dir: &Path) -> Result<Self> {
        let dir = storage_dir.join("blobs");
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn path(&self, id: FileId) -> PathBuf {
        self.dir.join(format!("{}.blob", id))
    }

    pub async fn write(&self, id: FileId, content: &[u8]) -> Result<()> {
        let mut file = fs::File::create(self.path(id)).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }

    pub async fn open_blob(&self, id: FileId) -> Result<fs::File> {
        Ok(fs::File::open(self.path(id)).await?)
    }

    /// Removes a blob; a blob that is already gone counts as removed.
    pub async fn remove(&self, id: FileId) -> Result<()> {
        match fs::remove_file(self.path(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::IoError(err)),
        }
    }
}

pub async fn load_snapshot(path: &Path) -> Result<Option<FolderTree>> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AppError::IoError(err)),
    };

    let tree: FolderTree = serde_json::from_slice(&raw).map_err(|e| {
        AppError::InternalError(format!("Corrupt snapshot {}: {}", path.display(), e))
    })?;
    tree.check_integrity().map_err(|e| {
        AppError::InternalError(format!("Snapshot {}: {}", path.display(), e))
    })?;

    Ok(Some(tree))
}

/// Writes to a sibling temp file first so a crash never leaves a torn snapshot.
pub async fn save_snapshot(path: &Path, tree: &FolderTree) -> Result<()> {
    let raw = serde_json::to_vec_pretty(tree)
        .map_err(|e| AppError::InternalError(format!("Cannot serialize snapshot: {}", e)))?;

    let tmp = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp).await?;
    file.write_all(&raw).await?;
    file.sync_all().await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
