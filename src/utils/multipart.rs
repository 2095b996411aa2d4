use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::errors::AppError;

pub struct FilePart {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    /// Set when the part was larger than the read limit; `bytes` then holds
    /// only the bytes read up to that point.
    pub truncated: bool,
}

/// Reads the first part named `field_name`, buffering at most `limit + 1`
/// bytes. Other parts are skipped.
pub async fn read_file_part(
    mut payload: Multipart,
    field_name: &str,
    limit: usize,
) -> Result<Option<FilePart>, AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|err| AppError::ValidationFailed(err.to_string()))?;

        let disposition = field.content_disposition();
        if disposition.get_name() != Some(field_name) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|err| AppError::ValidationFailed(err.to_string()))?;
            }
            continue;
        }
        let file_name = disposition.get_filename().map(|s| s.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| AppError::ValidationFailed(err.to_string()))?;
            let room = limit.saturating_add(1).saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if bytes.len() > limit {
                return Ok(Some(FilePart {
                    file_name,
                    bytes,
                    truncated: true,
                }));
            }
        }

        return Ok(Some(FilePart {
            file_name,
            bytes,
            truncated: false,
        }));
    }
    Ok(None)
}
