/**
 * Certificate Routes
 * Upload, list and delete certificate files and their metadata rows
 */
use axum::{
    body::Bytes,
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Certificate, NewCertificate};
use crate::error::{AppError, OrInternal};
use crate::routes::MessageResponse;
use crate::state::AppState;
use crate::uploads::UploadDir;

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "pdf"];
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/pjpeg",
    "image/png",
    "application/pdf",
];
const DEFAULT_CATEGORY: &str = "education";
const UNSUPPORTED_TYPE: &str = "Only images (JPEG, JPG, PNG) and PDFs are allowed!";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub certificate: Certificate,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteCertificateRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// A file part that passed the type checks and was read in full.
#[derive(Debug)]
struct ReceivedFile {
    original_name: String,
    extension: String,
    bytes: Vec<u8>,
}

// ============================================================================
// Validation
// ============================================================================

/// Browsers may send a full client path; keep only the last component.
fn base_name(original: &str) -> &str {
    original.rsplit(['/', '\\']).next().unwrap_or(original)
}

/// Extension as sent, without the dot. Dotfiles like `.pdf` have none.
fn extension_of(name: &str) -> Option<&str> {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
}

fn display_name(name: &str) -> String {
    std::path::Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

fn is_allowed_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim();
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

fn category_or_default(category: Option<String>) -> String {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::validation("File too large. Maximum size is 10MB.");
    }
    tracing::warn!("Multipart error: {}", err);
    AppError::validation("Invalid multipart data")
}

/// Type checks run before a single byte is buffered.
async fn receive_file(mut field: Field<'_>) -> Result<ReceivedFile, AppError> {
    let original_name = base_name(field.file_name().unwrap_or("")).to_string();
    let extension = extension_of(&original_name)
        .filter(|ext| is_allowed_extension(ext))
        .map(str::to_string);
    let mime_ok = field.content_type().map(is_allowed_mime).unwrap_or(false);

    let extension = match extension {
        Some(ext) if mime_ok => ext,
        _ => return Err(AppError::validation(UNSUPPORTED_TYPE)),
    };

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_FILE_SIZE {
            return Err(AppError::validation("File too large. Maximum size is 10MB."));
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        return Err(AppError::validation("Empty file"));
    }

    Ok(ReceivedFile {
        original_name,
        extension,
        bytes,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/certificates - All certificates, newest first
pub async fn list_certificates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Certificate>>, AppError> {
    let certificates = state
        .store
        .list_certificates()
        .await
        .or_internal("Failed to fetch certificates")?;
    Ok(Json(certificates))
}

/// POST /api/certificates/upload - multipart `file` + optional `category`
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_certificate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<ReceivedFile> = None;
    let mut category: Option<String> = None;

    // Nothing touches disk until every part has been read and checked.
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                if file.is_some() {
                    return Err(AppError::validation("Only one file may be uploaded"));
                }
                file = Some(receive_file(field).await?);
            }
            Some("category") => {
                category = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::validation("No file uploaded"))?;

    let stored_filename = format!("{}.{}", Uuid::new_v4(), file.extension);
    let new_certificate = NewCertificate {
        id: Uuid::new_v4().to_string(),
        name: display_name(&file.original_name),
        category: category_or_default(category),
        filepath: UploadDir::public_path(&stored_filename),
        filename: stored_filename,
    };

    // File first: a crash in between leaves an orphan file, never an orphan row.
    state
        .uploads
        .write(&new_certificate.filename, &file.bytes)
        .await
        .or_internal("Failed to upload certificate")?;

    let certificate = match state.store.insert_certificate(&new_certificate).await {
        Ok(certificate) => certificate,
        Err(e) => {
            if let Err(cleanup) = state.uploads.remove(&new_certificate.filename).await {
                tracing::warn!(
                    "Could not remove orphaned upload {}: {}",
                    new_certificate.filename,
                    cleanup
                );
            }
            return Err(AppError::internal("Failed to upload certificate", e));
        }
    };

    tracing::info!(
        "Certificate uploaded: {} -> {} ({} bytes)",
        file.original_name,
        certificate.filename,
        file.bytes.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Certificate uploaded successfully".to_string(),
            certificate,
        }),
    ))
}

/// DELETE /api/certificates/{id} - body `{ "password": "..." }`
///
/// The file goes first, then the row. A crash in between leaves a row whose
/// file 404s; repeating the delete finishes the job.
#[tracing::instrument(skip(state, body))]
pub async fn delete_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request: DeleteCertificateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        DeleteCertificateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid JSON body: {}", e)))?
    };

    if !state.authorize_delete(request.password.as_deref()) {
        return Err(AppError::Forbidden("Incorrect password".to_string()));
    }

    let certificate = state
        .store
        .find_certificate(&id)
        .await
        .or_internal("Failed to delete certificate")?
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    let removed = state
        .uploads
        .remove(&certificate.filename)
        .await
        .or_internal("Failed to delete certificate")?;
    if !removed {
        tracing::warn!("File for certificate {} was already missing", certificate.id);
    }

    let deleted = state
        .store
        .delete_certificate(&id)
        .await
        .or_internal("Failed to delete certificate")?;
    if !deleted {
        return Err(AppError::NotFound("Certificate not found".to_string()));
    }

    tracing::info!("Certificate deleted: {}", certificate.id);
    Ok(Json(MessageResponse::new("Certificate deleted successfully")))
}
