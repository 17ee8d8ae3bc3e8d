use crate::error::UploadError;
use actix_multipart::Multipart;
use futures_util::StreamExt;

pub(crate) struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reads the multipart field named `file` into memory. Other fields are
/// drained and ignored; if `file` appears twice the last one wins.
pub(crate) async fn read_file_field(mut payload: Multipart) -> Result<UploadedFile, UploadError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if field_name.as_deref() != Some("file") {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        upload = Some(UploadedFile { file_name, bytes });
    }

    let upload = upload.ok_or(UploadError::MissingFile)?;
    if upload.bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(upload)
}
