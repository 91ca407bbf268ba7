//! Boundary to the remote services the submission core depends on.

mod http;
pub mod storage;
pub mod submissions_http;
pub mod uploads_http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::schemas::{Assignment, Submission, SubmissionPayload, UploadedBinary};
use crate::services::drafts::LocalFile;

pub use storage::S3BinaryStore;
pub use submissions_http::HttpSubmissionApi;
pub use uploads_http::HttpBinaryStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Result of `DeleteSubmission`; a refusal is an answer, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Forbidden(String),
}

/// The learner-facing submission service.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    async fn get_assignment(&self, assignment_id: &str) -> Result<Assignment, ClientError>;

    /// `Ok(None)` when the learner has not submitted.
    async fn get_my_submission(&self, assignment_id: &str)
        -> Result<Option<Submission>, ClientError>;

    async fn create_submission(
        &self,
        assignment_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, ClientError>;

    async fn amend_submission(
        &self,
        assignment_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, ClientError>;

    async fn delete_submission(&self, assignment_id: &str) -> Result<DeleteOutcome, ClientError>;
}

/// External binary storage. The core never keeps file bytes past an upload.
#[async_trait]
pub trait BinaryStore: Send + Sync {
    async fn upload_binary(&self, file: &LocalFile) -> Result<UploadedBinary, ClientError>;
}

pub(crate) fn extract_error_message(payload: &Value) -> Option<String> {
    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return Some(text.to_string());
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::extract_error_message;
    use serde_json::json;

    #[test]
    fn error_message_prefers_detail() {
        let payload = json!({"detail": "Submission is graded", "message": "other"});
        assert_eq!(extract_error_message(&payload).as_deref(), Some("Submission is graded"));
    }

    #[test]
    fn error_message_joins_detail_items() {
        let payload = json!({"detail": [{"msg": "title required"}, {"message": "bad link"}]});
        assert_eq!(extract_error_message(&payload).as_deref(), Some("title required; bad link"));
    }

    #[test]
    fn error_message_falls_back_to_error_field() {
        assert_eq!(extract_error_message(&json!({"error": "conflict"})).as_deref(), Some("conflict"));
        assert_eq!(extract_error_message(&json!({"status": 500})), None);
    }
}
