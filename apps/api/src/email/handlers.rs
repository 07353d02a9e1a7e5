//! Axum route handlers for the email analysis API.

use anyhow::anyhow;
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::email::classifier::analyze_email;
use crate::email::extract::extract_text;
use crate::email::models::{AnalysisResult, EmailInput};
use crate::errors::AppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// A file pulled out of a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// POST /process-email
pub async fn handle_process_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailInput>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    info!(
        "Received email for processing ({} chars)",
        request.email_text.chars().count()
    );
    let result = analyze_email(&request.email_text, state.model.as_ref()).await?;
    Ok(Json(result))
}

/// POST /upload-file
///
/// Accepts a `.txt` or `.pdf` under the multipart field `file`. The
/// extension is checked before anything is sent to the model.
pub async fn handle_upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let upload = read_upload(multipart).await?;
    info!(
        "Received file '{}' ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    let UploadedFile { filename, bytes } = upload;
    let email_text = tokio::task::spawn_blocking(move || extract_text(&filename, &bytes))
        .await
        .map_err(extraction_task_error)??;

    let result = analyze_email(&email_text, state.model.as_ref()).await?;
    Ok(Json(result))
}

/// Takes the field named `file`, or else the first field that carries a filename.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut fallback: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file_field = field.name() == Some(FILE_FIELD);
        let Some(filename) = field.file_name().map(String::from) else {
            if is_file_field {
                return Err(AppError::Validation(
                    "The 'file' field has no filename".to_string(),
                ));
            }
            continue;
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        let upload = UploadedFile { filename, bytes };

        if is_file_field {
            return Ok(upload);
        }
        if fallback.is_none() {
            fallback = Some(upload);
        }
    }

    fallback.ok_or_else(|| {
        warn!("Upload request carried no file");
        AppError::Validation("No file was uploaded".to_string())
    })
}

/// Body-limit hits become 413; every other multipart failure is the caller's malformed body.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload rejected: {}", e.body_text());
        AppError::PayloadTooLarge("Uploaded file exceeds the maximum upload size".to_string())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// A panicked or cancelled extraction task is a server fault, not a bad file.
fn extraction_task_error(e: JoinError) -> AppError {
    AppError::Internal(anyhow!("extraction task failed: {e}"))
}
