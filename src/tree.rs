//! In-memory folder hierarchy and file metadata.
//!
//! The tree is plain data: it knows nothing about blobs on disk or HTTP. Every
//! mutation keeps three invariants: there is exactly one root (id `0`, no
//! parent), every non-root folder and every file points at an existing folder,
//! and no folder is its own ancestor.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

pub type FolderId = u64;
pub type FileId = u64;

pub const ROOT_FOLDER_ID: FolderId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: FileId,
    pub name: String,
    pub parent_id: FolderId,
    pub size: u64,
    pub checksum: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("folder {0} does not exist")]
    FolderNotFound(FolderId),

    #[error("file {0} does not exist")]
    FileNotFound(FileId),

    #[error("the root folder cannot be moved")]
    RootFolderMove,

    #[error("the root folder cannot be deleted")]
    RootFolderDelete,

    #[error("folder {folder} cannot be moved into its own subtree ({dest})")]
    CyclicMove { folder: FolderId, dest: FolderId },

    #[error("inconsistent tree: {0}")]
    Corrupt(String),
}

/// Folders and files removed by a cascade delete.
#[derive(Debug, Default)]
pub struct Removed {
    pub folders: Vec<FolderId>,
    pub files: Vec<FileNode>,
}

/// Immediate children of one folder, sorted by id.
#[derive(Debug)]
pub struct Children<'a> {
    pub folder: &'a FolderNode,
    pub folders: Vec<&'a FolderNode>,
    pub files: Vec<&'a FileNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    folders: BTreeMap<FolderId, FolderNode>,
    files: BTreeMap<FileId, FileNode>,
    next_folder_id: FolderId,
    next_file_id: FileId,
}

impl Default for FolderTree {
    fn default() -> Self {
        Self::new("")
    }
}

impl FolderTree {
    pub fn new(root_name: &str) -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(
            ROOT_FOLDER_ID,
            FolderNode {
                id: ROOT_FOLDER_ID,
                name: root_name.to_string(),
                parent_id: None,
            },
        );

        Self {
            folders,
            files: BTreeMap::new(),
            next_folder_id: ROOT_FOLDER_ID + 1,
            next_file_id: 0,
        }
    }

    /// Fixture tree the service can boot with: `Photos` under root and
    /// `Summer` inside it.
    pub fn with_demo_content() -> Self {
        let mut tree = Self::default();
        let photos = tree.create_folder("Photos", None).unwrap_or(ROOT_FOLDER_ID);
        let _ = tree.create_folder("Summer", Some(photos));
        tree
    }

    pub fn root(&self) -> &FolderNode {
        // The root is inserted in `new` and never removed.
        &self.folders[&ROOT_FOLDER_ID]
    }

    pub fn folder(&self, id: FolderId) -> Result<&FolderNode, TreeError> {
        self.folders.get(&id).ok_or(TreeError::FolderNotFound(id))
    }

    pub fn file(&self, id: FileId) -> Result<&FileNode, TreeError> {
        self.files.get(&id).ok_or(TreeError::FileNotFound(id))
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn children(&self, id: FolderId) -> Result<Children<'_>, TreeError> {
        let folder = self.folder(id)?;

        let folders = self
            .folders
            .values()
            .filter(|f| f.parent_id == Some(id))
            .collect();
        let files = self.files.values().filter(|f| f.parent_id == id).collect();

        Ok(Children {
            folder,
            folders,
            files,
        })
    }

    pub fn create_folder(
        &mut self,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Result<FolderId, TreeError> {
        let parent_id = parent_id.unwrap_or(ROOT_FOLDER_ID);
        self.folder(parent_id)?;

        let id = self.next_folder_id;
        self.next_folder_id += 1;
        self.folders.insert(
            id,
            FolderNode {
                id,
                name: name.to_string(),
                parent_id: Some(parent_id),
            },
        );
        Ok(id)
    }

    pub fn rename_folder(&mut self, id: FolderId, name: &str) -> Result<(), TreeError> {
        let folder = self
            .folders
            .get_mut(&id)
            .ok_or(TreeError::FolderNotFound(id))?;
        folder.name = name.to_string();
        Ok(())
    }

    pub fn move_folder(&mut self, id: FolderId, dest: FolderId) -> Result<(), TreeError> {
        if id == ROOT_FOLDER_ID {
            return Err(TreeError::RootFolderMove);
        }
        self.folder(id)?;
        self.folder(dest)?;

        if self.is_within(dest, id) {
            return Err(TreeError::CyclicMove { folder: id, dest });
        }

        if let Some(folder) = self.folders.get_mut(&id) {
            folder.parent_id = Some(dest);
        }
        Ok(())
    }

    /// Removes `id` with every folder and file below it.
    pub fn delete_folder(&mut self, id: FolderId) -> Result<Removed, TreeError> {
        if id == ROOT_FOLDER_ID {
            return Err(TreeError::RootFolderDelete);
        }
        self.folder(id)?;

        let mut removed = Removed::default();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            removed.folders.push(current);
            queue.extend(
                self.folders
                    .values()
                    .filter(|f| f.parent_id == Some(current))
                    .map(|f| f.id),
            );
        }

        for folder_id in &removed.folders {
            self.folders.remove(folder_id);
        }

        let doomed: Vec<FileId> = self
            .files
            .values()
            .filter(|f| !self.folders.contains_key(&f.parent_id))
            .map(|f| f.id)
            .collect();
        for file_id in doomed {
            if let Some(file) = self.files.remove(&file_id) {
                removed.files.push(file);
            }
        }

        Ok(removed)
    }

    /// Hands out the next file id without inserting anything, so the blob can
    /// be written before the metadata becomes visible.
    pub fn reserve_file_id(&mut self) -> FileId {
        let id = self.next_file_id;
        self.next_file_id += 1;
        id
    }

    pub fn insert_file(&mut self, file: FileNode) -> Result<FileId, TreeError> {
        self.folder(file.parent_id)?;
        if file.id >= self.next_file_id {
            self.next_file_id = file.id + 1;
        }
        let id = file.id;
        self.files.insert(id, file);
        Ok(id)
    }

    pub fn rename_file(&mut self, id: FileId, name: &str) -> Result<(), TreeError> {
        let file = self.files.get_mut(&id).ok_or(TreeError::FileNotFound(id))?;
        file.name = name.to_string();
        Ok(())
    }

    pub fn move_file(&mut self, id: FileId, dest: FolderId) -> Result<(), TreeError> {
        self.file(id)?;
        self.folder(dest)?;
        if let Some(file) = self.files.get_mut(&id) {
            file.parent_id = dest;
        }
        Ok(())
    }

    pub fn delete_file(&mut self, id: FileId) -> Result<FileNode, TreeError> {
        self.files.remove(&id).ok_or(TreeError::FileNotFound(id))
    }

    /// True when `candidate` is `ancestor` or lies somewhere below it.
    fn is_within(&self, candidate: FolderId, ancestor: FolderId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.folders.get(&id).and_then(|f| f.parent_id);
        }
        false
    }

    /// Checks a deserialized tree before it is trusted.
    pub fn check_integrity(&self) -> Result<(), TreeError> {
        let corrupt = |msg: String| Err(TreeError::Corrupt(msg));

        match self.folders.get(&ROOT_FOLDER_ID) {
            Some(root) if root.parent_id.is_none() => {}
            Some(_) => return corrupt("root folder has a parent".to_string()),
            None => return corrupt("root folder is missing".to_string()),
        }

        for folder in self.folders.values() {
            if folder.id >= self.next_folder_id {
                return corrupt(format!("folder {} is beyond the id sequence", folder.id));
            }
            if folder.id == ROOT_FOLDER_ID {
                continue;
            }
            let Some(parent) = folder.parent_id else {
                return corrupt(format!("folder {} has no parent", folder.id));
            };
            if !self.folders.contains_key(&parent) {
                return corrupt(format!(
                    "folder {} points at missing parent {}",
                    folder.id, parent
                ));
            }
            // Walking up must reach the root within `len` steps.
            let mut current = folder.parent_id;
            let mut steps = 0;
            while let Some(id) = current {
                steps += 1;
                if steps > self.folders.len() {
                    return corrupt(format!("folder {} is part of a cycle", folder.id));
                }
                current = self.folders.get(&id).and_then(|f| f.parent_id);
            }
        }

        for file in self.files.values() {
            if file.id >= self.next_file_id {
                return corrupt(format!("file {} is beyond the id sequence", file.id));
            }
            if !self.folders.contains_key(&file.parent_id) {
                return corrupt(format!(
                    "file {} points at missing folder {}",
                    file.id, file.parent_id
                ));
            }
        }

        Ok(())
    }
}
