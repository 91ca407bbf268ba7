use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::resource::{FileType, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    /// Fixed by the write that produced this record.
    pub is_late: bool,
    #[serde(default)]
    pub student_comment: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub graded_at: Option<OffsetDateTime>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

/// Body of a create or amend write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(default)]
    pub comment: Option<String>,
    pub resources: Vec<Resource>,
}

impl SubmissionPayload {
    pub fn new(comment: Option<String>, resources: Vec<Resource>) -> Self {
        let comment = comment.map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        Self { comment, resources }
    }
}

/// Result of a successful binary upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedBinary {
    pub resource_link: String,
    pub title: String,
    pub file_type: FileType,
}

impl From<UploadedBinary> for Resource {
    fn from(value: UploadedBinary) -> Self {
        Resource { title: value.title, resource_link: value.resource_link, file_type: value.file_type }
    }
}
