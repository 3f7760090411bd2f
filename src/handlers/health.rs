use axum::{extract::State, http::StatusCode, Json};

use crate::{models::HealthResponse, state::AppState};

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let tree = state.tree.read().await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            folders: tree.folder_count(),
            files: tree.file_count(),
        }),
    )
}
