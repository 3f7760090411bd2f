//! Hierarchical folder and file storage served over HTTP.
//!
//! A single root folder (id `0`) anchors a tree of folders; uploaded files
//! live in folders and keep their original filename. See [`create_router`]
//! for the exposed endpoints.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod security;
pub mod services;
pub mod state;
pub mod storage;
pub mod tree;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use crate::config::Config;
pub use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health-check", get(handlers::health::health_check))
        // Folder operations
        .route(
            "/folders",
            get(handlers::folders::list_root).post(handlers::folders::create_folder),
        )
        .route(
            "/folders/:id",
            get(handlers::folders::get_folder)
                .put(handlers::folders::update_folder)
                .delete(handlers::folders::delete_folder),
        )
        .route("/MoveFolder/:id", put(handlers::folders::move_folder))
        // File operations
        .route(
            "/UploadFile",
            // The handler enforces `max_upload_size` itself while streaming.
            post(handlers::files::upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/DownloadFile/:id", get(handlers::files::download_file))
        .route("/MoveFile/:id", put(handlers::files::move_file))
        .route(
            "/files/:id",
            get(handlers::files::get_file)
                .put(handlers::files::update_file)
                .delete(handlers::files::delete_file),
        )
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
