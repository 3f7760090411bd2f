use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::Result,
    storage::{self, BlobStore},
    tree::{FolderTree, TreeError},
};

/// Shared handle passed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tree: Arc<RwLock<FolderTree>>,
    pub blobs: BlobStore,
    pub started_at: Instant,
}

impl AppState {
    /// Opens the storage directory and restores the tree from its snapshot
    /// when one exists.
    pub async fn open(config: Config) -> Result<Self> {
        let blobs = BlobStore::open(&config.storage_dir).await?;

        let restored = if config.persist_metadata {
            storage::load_snapshot(&config.snapshot_path()).await?
        } else {
            None
        };

        let tree = match restored {
            Some(tree) => {
                tracing::info!(
                    folders = tree.folder_count(),
                    files = tree.file_count(),
                    "Restored folder tree from snapshot"
                );
                tree
            }
            None if config.seed_demo_content => {
                tracing::info!("Seeding demo folders");
                FolderTree::with_demo_content()
            }
            None => FolderTree::default(),
        };

        Ok(Self {
            config: Arc::new(config),
            tree: Arc::new(RwLock::new(tree)),
            blobs,
            started_at: Instant::now(),
        })
    }

    /// Applies `change` to a copy of the tree and publishes the copy only once
    /// its snapshot is on disk. A failed change or a failed save leaves the
    /// shared tree as it was.
    pub async fn update_tree<T, F>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut FolderTree) -> std::result::Result<T, TreeError>,
    {
        let mut tree = self.tree.write().await;
        let mut next = tree.clone();
        let value = change(&mut next)?;
        self.persist(&next).await?;
        *tree = next;
        Ok(value)
    }

    async fn persist(&self, tree: &FolderTree) -> Result<()> {
        if !self.config.persist_metadata {
            return Ok(());
        }
        storage::save_snapshot(&self.config.snapshot_path(), tree).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage_dir = temp_dir.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_open_empty_storage() {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::open(test_config(&temp_dir)).await.unwrap();

        let tree = state.tree.read().await;
        assert_eq!(tree.folder_count(), 1);
        assert!(temp_dir.path().join("blobs").is_dir());
    }

    #[tokio::test]
    async fn test_seed_only_without_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.seed_demo_content = true;

        let state = AppState::open(config.clone()).await.unwrap();
        state
            .update_tree(|tree| {
                let photos = tree.children(0)?.folders[0].id;
                tree.delete_folder(photos)
            })
            .await
            .unwrap();

        // The snapshot wins over seeding on the next start.
        let reopened = AppState::open(config).await.unwrap();
        assert_eq!(reopened.tree.read().await.folder_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_tree() {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::open(test_config(&temp_dir)).await.unwrap();
        let a = state
            .update_tree(|tree| tree.create_folder("a", None))
            .await
            .unwrap();

        // A directory where the temp snapshot goes makes every save fail.
        std::fs::create_dir(temp_dir.path().join("index.json.tmp")).unwrap();

        let result = state.update_tree(|tree| tree.delete_folder(a)).await;
        assert!(result.is_err());
        assert!(state.tree.read().await.folder(a).is_ok());

        let restored = storage::load_snapshot(&state.config.snapshot_path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored, *state.tree.read().await);
    }
}
