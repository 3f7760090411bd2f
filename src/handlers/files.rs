use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use tokio_util::io::ReaderStream;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    extractors::{AppPath, AppQuery, JsonBody},
    models::*,
    security,
    services::FileService,
    state::AppState,
    tree::FileId,
};

/// Multipart part carrying the file content.
pub const UPLOAD_FIELD: &str = "upload";

/// Responds with the new id as a bare JSON number.
pub async fn upload_file(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UploadQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileId>)> {
    let max = state.config.max_upload_size;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::InvalidInput(format!("Invalid multipart data: {}", e.body_text()))
    })? {
        if field.name() != Some(UPLOAD_FIELD) || upload.is_some() {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("Upload has no filename".to_string()))?;

        // Read chunk by chunk so an oversized upload is rejected without
        // buffering all of it.
        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            AppError::InvalidInput(format!("Failed to read upload: {}", e.body_text()))
        })? {
            if content.len() + chunk.len() > max {
                return Err(AppError::FileTooLarge(content.len() + chunk.len(), max));
            }
            content.extend_from_slice(&chunk);
        }

        upload = Some((filename, content));
    }

    let (filename, content) = upload.ok_or_else(|| {
        AppError::InvalidInput(format!("Missing multipart part '{}'", UPLOAD_FIELD))
    })?;

    let id = FileService::upload(&state, query.dest, &filename, content).await?;
    Ok((StatusCode::CREATED, Json(id)))
}

pub async fn download_file(
    State(state): State<AppState>,
    AppPath(file_id): AppPath<FileId>,
) -> Result<Response> {
    let download = FileService::open_download(&state, file_id).await?;
    let file = download.file;

    let content_type = mime_guess::from_path(&file.name)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            security::content_disposition_header(&file.name),
        )
        .header(header::CONTENT_LENGTH, file.size)
        .header(header::ETAG, format!("\"{}\"", file.checksum))
        .body(Body::from_stream(ReaderStream::new(download.blob)))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {}", e)))
}

pub async fn get_file(
    State(state): State<AppState>,
    AppPath(file_id): AppPath<FileId>,
) -> Result<Json<FileResponse>> {
    let response = FileService::get_file(&state, file_id).await?;
    Ok(Json(response))
}

pub async fn update_file(
    State(state): State<AppState>,
    AppPath(file_id): AppPath<FileId>,
    JsonBody(request): JsonBody<UpdateFileRequest>,
) -> Result<StatusCode> {
    request.validate().map_err(AppError::from)?;

    FileService::update_file(&state, file_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_file(
    State(state): State<AppState>,
    AppPath(file_id): AppPath<FileId>,
    AppQuery(query): AppQuery<DestQuery>,
) -> Result<StatusCode> {
    FileService::move_file(&state, file_id, query.dest).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_file(
    State(state): State<AppState>,
    AppPath(file_id): AppPath<FileId>,
) -> Result<StatusCode> {
    FileService::delete_file(&state, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
