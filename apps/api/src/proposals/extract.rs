//! Text extraction for uploaded drafts.
//!
//! Plain-text uploads are decoded by trying UTF-8, then UTF-16, then
//! Windows-1252. The last decoder maps every byte, so decoding never fails.
//! PDF uploads are detected by their magic bytes and parsed on the blocking pool.
//! All output has its whitespace runs collapsed into single spaces.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use tracing::{debug, warn};

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extracts normalized text from an uploaded file body.
///
/// Callers reject empty bodies before calling this. An upload that decodes to
/// nothing but whitespace is rejected here.
pub async fn extract_text(content: bytes::Bytes) -> Result<String, AppError> {
    let text = if content.starts_with(PDF_MAGIC) {
        extract_pdf_text(content).await?
    } else {
        decode_text(&content)
    };

    if text.is_empty() {
        return Err(AppError::Validation(
            "Unable to extract readable text from the uploaded file.".to_string(),
        ));
    }
    Ok(text)
}

async fn extract_pdf_text(content: bytes::Bytes) -> Result<String, AppError> {
    // pdf-extract can panic on malformed documents; a panicked task is treated
    // the same as a parse error.
    let result = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&content).map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(format!("extraction task aborted: {e}")));

    match result {
        Ok(raw) => Ok(normalize_whitespace(&raw)),
        Err(e) => {
            warn!("PDF extraction failed: {e}");
            Err(AppError::Validation(
                "Unable to read the uploaded PDF.".to_string(),
            ))
        }
    }
}

/// Decodes raw bytes with the first encoding that accepts them, then normalizes whitespace.
pub fn decode_text(content: &[u8]) -> String {
    let decoded = decode_strict(UTF_8, strip_prefix(content, b"\xEF\xBB\xBF"))
        .or_else(|| decode_utf16(content))
        .unwrap_or_else(|| {
            debug!("Falling back to single-byte decoding");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(content);
            text.into_owned()
        });
    normalize_whitespace(&decoded)
}

/// UTF-16 honouring a byte-order mark, little-endian when there is none.
fn decode_utf16(content: &[u8]) -> Option<String> {
    if let Some(rest) = content.strip_prefix(b"\xFE\xFF") {
        decode_strict(UTF_16BE, rest)
    } else if let Some(rest) = content.strip_prefix(b"\xFF\xFE") {
        decode_strict(UTF_16LE, rest)
    } else {
        decode_strict(UTF_16LE, content)
    }
}

fn decode_strict(encoding: &'static Encoding, content: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(content)
        .map(|text| text.into_owned())
}

fn strip_prefix<'a>(content: &'a [u8], prefix: &[u8]) -> &'a [u8] {
    content.strip_prefix(prefix).unwrap_or(content)
}

/// Collapses every run of whitespace into one space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
