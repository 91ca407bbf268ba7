//! Fail-closed acceptance check for file drafts, run before any upload.

use uuid::Uuid;

use crate::core::config::Settings;
use crate::errors::SubmissionError;
use crate::schemas::FileType;
use crate::services::drafts::LocalFile;

const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 20;

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            ["pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "odt", "txt"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            DEFAULT_MAX_UPLOAD_SIZE_MB,
        )
    }
}

impl UploadPolicy {
    pub fn new(allowed_extensions: Vec<String>, max_upload_size_mb: u64) -> Self {
        Self { allowed_extensions, max_bytes: max_upload_size_mb.saturating_mul(1024 * 1024) }
    }

    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.upload().allowed_extensions.clone(),
            settings.upload().max_upload_size_mb,
        )
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Returns the document type the file will be committed as.
    pub fn check(&self, draft_id: Uuid, file: &LocalFile) -> Result<FileType, SubmissionError> {
        let extension = file.extension().ok_or_else(|| {
            SubmissionError::upload(draft_id, format!("'{}' has no extension", file.file_name))
        })?;

        let file_type = FileType::from_extension(&extension)
            .filter(|_| self.allowed_extensions.iter().any(|allowed| allowed == &extension))
            .ok_or_else(|| {
                SubmissionError::upload(
                    draft_id,
                    format!("file extension '{extension}' is not an accepted document type"),
                )
            })?;

        let mime = file.content_type.trim().to_ascii_lowercase();
        if !mime_allowed_for_extension(&mime, &extension) {
            return Err(SubmissionError::upload(
                draft_id,
                format!("MIME type '{mime}' does not match extension '.{extension}'"),
            ));
        }

        if file.bytes.is_empty() {
            return Err(SubmissionError::upload(draft_id, format!("'{}' is empty", file.file_name)));
        }

        if file.size() > self.max_bytes {
            return Err(SubmissionError::upload(
                draft_id,
                format!("'{}' exceeds {}MB limit", file.file_name, self.max_bytes / (1024 * 1024)),
            ));
        }

        if !magic_bytes_match(&file.bytes, &extension) {
            return Err(SubmissionError::upload(
                draft_id,
                format!("content of '{}' does not look like a .{extension} file", file.file_name),
            ));
        }

        Ok(file_type)
    }
}

pub(crate) fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "ppt" => Some("application/vnd.ms-powerpoint"),
        "pptx" => {
            Some("application/vnd.openxmlformats-officedocument.presentationml.presentation")
        }
        "xls" => Some("application/vnd.ms-excel"),
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        "odt" => Some("application/vnd.oasis.opendocument.text"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

fn mime_allowed_for_extension(mime: &str, extension: &str) -> bool {
    // Browsers and some OSes report unknown types generically.
    if mime == "application/octet-stream" {
        return true;
    }
    let mime = mime.split(';').next().unwrap_or_default().trim();
    match extension {
        "pdf" => matches!(mime, "application/pdf" | "application/x-pdf"),
        "txt" => mime == "text/plain",
        _ => content_type_for_extension(extension) == Some(mime),
    }
}

fn magic_bytes_match(data: &[u8], extension: &str) -> bool {
    match extension {
        "pdf" => data.starts_with(b"%PDF"),
        // OLE compound document
        "doc" | "xls" | "ppt" => {
            data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        // ZIP container
        "docx" | "xlsx" | "pptx" | "odt" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        "txt" => true,
        _ => false,
    }
}
