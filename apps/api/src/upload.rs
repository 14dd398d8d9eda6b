//! Multipart upload extraction shared by the file-accepting endpoints.

use axum::extract::Multipart;

use crate::errors::AppError;

/// An uploaded file taken from a multipart form.
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: bytes::Bytes,
}

/// Reads the multipart field named `field`. Other fields are ignored.
pub async fn read_upload(mut multipart: Multipart, field: &str) -> Result<Option<Upload>, AppError> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().map(String::from);
        let content_type = part.content_type().map(String::from);
        let content = part
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok(Some(Upload {
            file_name,
            content_type,
            content,
        }));
    }
    Ok(None)
}
