mod file_service;
mod folder_service;

pub use file_service::{Download, FileService};
pub use folder_service::FolderService;
