use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Why a requested transition was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// First submit requested while a submission already exists.
    AlreadySubmitted,
    /// Resubmit or withdraw requested with nothing submitted.
    NoSubmission,
    /// The submission carries a grade and is frozen.
    Graded,
    /// Withdraw requested after the due date.
    PastDue,
    /// The submission service refused the delete.
    RemoteForbidden(String),
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::AlreadySubmitted => f.write_str("a submission already exists"),
            ForbiddenReason::NoSubmission => f.write_str("there is no submission yet"),
            ForbiddenReason::Graded => f.write_str("the submission has already been graded"),
            ForbiddenReason::PastDue => f.write_str("the due date has passed"),
            ForbiddenReason::RemoteForbidden(message) => {
                write!(f, "the submission service refused: {message}")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// No usable resource, or a malformed draft. Nothing was sent.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A file draft was refused by the acceptance check or the storage service.
    #[error("upload failed for draft {draft_id}: {message}")]
    Upload { draft_id: Uuid, message: String },
    #[error("operation not allowed: {0}")]
    ForbiddenTransition(ForbiddenReason),
    /// The service was reachable but refused the write.
    #[error("submission service rejected the write: {0}")]
    RemoteWrite(String),
    /// Assignment or submission could not be read before deciding.
    #[error("failed to load submission state: {0}")]
    Fetch(String),
    #[error("an operation for assignment {0} is already in progress")]
    InFlight(String),
}

impl SubmissionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn upload(draft_id: Uuid, message: impl fmt::Display) -> Self {
        Self::Upload { draft_id, message: message.to_string() }
    }

    /// Metric label for the error kind.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Validation(_) => "validation",
            SubmissionError::Upload { .. } => "upload",
            SubmissionError::ForbiddenTransition(_) => "forbidden",
            SubmissionError::RemoteWrite(_) => "remote_write",
            SubmissionError::Fetch(_) => "fetch",
            SubmissionError::InFlight(_) => "in_flight",
        }
    }
}
