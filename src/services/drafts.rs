//! Attachments being edited before they are committed to a submission.

use std::fmt;
use std::path::Path;

use uuid::Uuid;
use validator::Validate;

use crate::errors::SubmissionError;
use crate::schemas::{FileType, Resource};
use crate::services::upload_policy::content_type_for_extension;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Link,
    File,
}

/// Local binary handle bound to a file draft.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self { file_name: file_name.into(), content_type: content_type.into(), bytes }
    }

    /// Reads a file from disk, guessing the content type from its extension.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
            .unwrap_or_else(|| "upload".to_string());
        let content_type = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for_extension)
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self { file_name, content_type, bytes })
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftKind {
    /// `file_type` is `Link` for typed links; a committed document keeps its
    /// stored type until the link is edited.
    Link { title: String, resource_link: String, file_type: FileType },
    File(Option<LocalFile>),
    /// A file draft whose upload succeeded. Frozen.
    Uploaded(Resource),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDraft {
    id: Uuid,
    kind: DraftKind,
}

#[derive(Debug, Validate)]
struct LinkFields {
    #[validate(length(min = 1, message = "title must not be empty"))]
    title: String,
    #[validate(url(message = "resource link must be a valid URL"))]
    resource_link: String,
}

impl ResourceDraft {
    pub fn empty_link() -> Self {
        Self::link(String::new(), String::new())
    }

    pub fn link(title: impl Into<String>, resource_link: impl Into<String>) -> Self {
        Self::with_kind(DraftKind::Link {
            title: title.into(),
            resource_link: resource_link.into(),
            file_type: FileType::Link,
        })
    }

    pub fn file(file: LocalFile) -> Self {
        Self::with_kind(DraftKind::File(Some(file)))
    }

    pub fn unbound_file() -> Self {
        Self::with_kind(DraftKind::File(None))
    }

    /// Committed resources always come back as link-type drafts, whatever
    /// they were uploaded as.
    pub fn from_resource(resource: &Resource) -> Self {
        Self::with_kind(DraftKind::Link {
            title: resource.title.clone(),
            resource_link: resource.resource_link.clone(),
            file_type: resource.file_type,
        })
    }

    fn with_kind(kind: DraftKind) -> Self {
        Self { id: Uuid::new_v4(), kind }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &DraftKind {
        &self.kind
    }

    pub fn input_type(&self) -> InputType {
        match self.kind {
            DraftKind::Link { .. } => InputType::Link,
            DraftKind::File(_) | DraftKind::Uploaded(_) => InputType::File,
        }
    }

    pub fn is_immutable(&self) -> bool {
        matches!(self.kind, DraftKind::Uploaded(_))
    }

    /// An untouched slot: nothing typed, nothing bound.
    pub fn is_blank(&self) -> bool {
        match &self.kind {
            DraftKind::Link { title, resource_link, .. } => {
                title.trim().is_empty() && resource_link.trim().is_empty()
            }
            DraftKind::File(file) => file.is_none(),
            DraftKind::Uploaded(_) => false,
        }
    }

    pub fn set_title(&mut self, value: impl Into<String>) -> Result<(), SubmissionError> {
        match &mut self.kind {
            DraftKind::Link { title, .. } => {
                *title = value.into();
                Ok(())
            }
            DraftKind::File(_) => {
                Err(SubmissionError::validation("file drafts take their title from the upload"))
            }
            DraftKind::Uploaded(_) => Err(frozen(self.id)),
        }
    }

    pub fn set_link(&mut self, value: impl Into<String>) -> Result<(), SubmissionError> {
        match &mut self.kind {
            DraftKind::Link { resource_link, file_type, .. } => {
                let value = value.into();
                if value != *resource_link {
                    *resource_link = value;
                    *file_type = FileType::Link;
                }
                Ok(())
            }
            DraftKind::File(_) => {
                Err(SubmissionError::validation("file drafts take their link from the upload"))
            }
            DraftKind::Uploaded(_) => Err(frozen(self.id)),
        }
    }

    pub fn bind_file(&mut self, file: LocalFile) -> Result<(), SubmissionError> {
        match &mut self.kind {
            DraftKind::File(slot) => {
                *slot = Some(file);
                Ok(())
            }
            DraftKind::Link { .. } => {
                Err(SubmissionError::validation("switch the draft to file input first"))
            }
            DraftKind::Uploaded(_) => Err(frozen(self.id)),
        }
    }

    /// Switching discards whatever the draft held.
    pub fn switch_input_type(&mut self, input_type: InputType) -> Result<(), SubmissionError> {
        if self.is_immutable() {
            return Err(frozen(self.id));
        }
        if self.input_type() == input_type {
            return Ok(());
        }
        self.kind = match input_type {
            InputType::Link => Self::empty_link().kind,
            InputType::File => DraftKind::File(None),
        };
        Ok(())
    }

    /// Committable form of a link draft: trimmed title and a valid URL.
    pub fn validate_link(&self) -> Result<Resource, SubmissionError> {
        let DraftKind::Link { title, resource_link, file_type } = &self.kind else {
            return Err(SubmissionError::validation(format!("draft {} is not a link", self.id)));
        };

        let fields = LinkFields {
            title: title.trim().to_string(),
            resource_link: resource_link.trim().to_string(),
        };
        fields.validate().map_err(|e| {
            SubmissionError::validation(format!("link draft {}: {}", self.id, e))
        })?;

        Ok(Resource {
            title: fields.title,
            resource_link: fields.resource_link,
            file_type: *file_type,
        })
    }

    pub(crate) fn mark_uploaded(&mut self, resource: Resource) {
        self.kind = DraftKind::Uploaded(resource);
    }
}

fn frozen(id: Uuid) -> SubmissionError {
    SubmissionError::validation(format!("draft {id} was already uploaded and cannot change"))
}
