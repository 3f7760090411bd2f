use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, Result},
    extractors::{AppPath, AppQuery, JsonBody},
    models::*,
    services::FolderService,
    state::AppState,
    tree::FolderId,
};

pub async fn list_root(State(state): State<AppState>) -> Result<Json<FolderContentResponse>> {
    let response = FolderService::get_content(&state, None).await?;
    Ok(Json(response))
}

pub async fn get_folder(
    State(state): State<AppState>,
    AppPath(folder_id): AppPath<FolderId>,
) -> Result<Json<FolderContentResponse>> {
    let response = FolderService::get_content(&state, Some(folder_id)).await?;
    Ok(Json(response))
}

/// Responds with the new id as a bare JSON number.
pub async fn create_folder(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderId>)> {
    request.validate().map_err(AppError::from)?;

    let id = FolderService::create_folder(&state, request).await?;
    Ok((StatusCode::CREATED, Json(id)))
}

pub async fn update_folder(
    State(state): State<AppState>,
    AppPath(folder_id): AppPath<FolderId>,
    JsonBody(request): JsonBody<UpdateFolderRequest>,
) -> Result<StatusCode> {
    request.validate().map_err(AppError::from)?;

    FolderService::update_folder(&state, folder_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_folder(
    State(state): State<AppState>,
    AppPath(folder_id): AppPath<FolderId>,
    AppQuery(query): AppQuery<DestQuery>,
) -> Result<StatusCode> {
    FolderService::move_folder(&state, folder_id, query.dest).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_folder(
    State(state): State<AppState>,
    AppPath(folder_id): AppPath<FolderId>,
) -> Result<StatusCode> {
    FolderService::delete_folder(&state, folder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
