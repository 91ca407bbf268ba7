//! Guarded choice of the write operation and its execution.

use time::OffsetDateTime;

use crate::clients::{ClientError, DeleteOutcome, SubmissionApi};
use crate::errors::{ForbiddenReason, SubmissionError};
use crate::schemas::{Submission, SubmissionPayload};
use crate::services::submission_state::is_late_at;

/// What the learner asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// First submission.
    Submit,
    /// Replace an existing submission's resources and comment.
    Resubmit,
    Withdraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Amend,
    LateResubmit,
    Withdraw,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Amend => "amend",
            Operation::LateResubmit => "late_resubmit",
            Operation::Withdraw => "withdraw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPlan {
    Create { late: bool },
    Amend,
    /// Full resubmission through the create endpoint; always late.
    LateResubmit,
    Withdraw,
    Rejected(ForbiddenReason),
}

impl TransitionPlan {
    pub fn operation(&self) -> Option<Operation> {
        self.permitted().ok()
    }

    /// The operation to run, or the refusal as an error.
    pub fn permitted(&self) -> Result<Operation, SubmissionError> {
        match self {
            TransitionPlan::Create { .. } => Ok(Operation::Create),
            TransitionPlan::Amend => Ok(Operation::Amend),
            TransitionPlan::LateResubmit => Ok(Operation::LateResubmit),
            TransitionPlan::Withdraw => Ok(Operation::Withdraw),
            TransitionPlan::Rejected(reason) => {
                Err(SubmissionError::ForbiddenTransition(reason.clone()))
            }
        }
    }

    /// Lateness the resulting record must carry, when the write decides it.
    /// `None` for amend (flag preserved) and withdraw.
    pub fn expected_late(&self) -> Option<bool> {
        match self {
            TransitionPlan::Create { late } => Some(*late),
            TransitionPlan::LateResubmit => Some(true),
            _ => None,
        }
    }
}

/// Pure guard evaluation. Inputs must be freshly read.
pub fn decide(
    intent: Intent,
    due_date: OffsetDateTime,
    now: OffsetDateTime,
    submission: Option<&Submission>,
) -> TransitionPlan {
    let past_due = is_late_at(due_date, now);

    match (intent, submission) {
        (Intent::Submit, None) => TransitionPlan::Create { late: past_due },
        (Intent::Submit, Some(_)) => TransitionPlan::Rejected(ForbiddenReason::AlreadySubmitted),
        (Intent::Resubmit | Intent::Withdraw, None) => {
            TransitionPlan::Rejected(ForbiddenReason::NoSubmission)
        }
        (_, Some(existing)) if existing.is_graded() => {
            TransitionPlan::Rejected(ForbiddenReason::Graded)
        }
        (Intent::Resubmit, Some(_)) if past_due => TransitionPlan::LateResubmit,
        (Intent::Resubmit, Some(_)) => TransitionPlan::Amend,
        (Intent::Withdraw, Some(_)) if past_due => {
            TransitionPlan::Rejected(ForbiddenReason::PastDue)
        }
        (Intent::Withdraw, Some(_)) => TransitionPlan::Withdraw,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteResult {
    Written(Submission),
    Withdrawn,
}

/// Interprets `plan` against the submission service. A rejected plan never
/// reaches the service, and neither does a write without resources.
pub async fn execute(
    api: &dyn SubmissionApi,
    assignment_id: &str,
    plan: &TransitionPlan,
    payload: Option<&SubmissionPayload>,
) -> Result<WriteResult, SubmissionError> {
    match plan {
        TransitionPlan::Rejected(reason) => {
            Err(SubmissionError::ForbiddenTransition(reason.clone()))
        }
        TransitionPlan::Withdraw => match api.delete_submission(assignment_id).await {
            Ok(DeleteOutcome::Deleted) => Ok(WriteResult::Withdrawn),
            Ok(DeleteOutcome::Forbidden(message)) => Err(SubmissionError::ForbiddenTransition(
                ForbiddenReason::RemoteForbidden(message),
            )),
            Err(err) => Err(write_error(err)),
        },
        TransitionPlan::Create { .. } | TransitionPlan::LateResubmit | TransitionPlan::Amend => {
            let payload = payload.filter(|payload| !payload.resources.is_empty()).ok_or_else(
                || SubmissionError::validation("a submission needs at least one resource"),
            )?;

            let written = match plan {
                TransitionPlan::Amend => api.amend_submission(assignment_id, payload).await,
                _ => api.create_submission(assignment_id, payload).await,
            };
            written.map(WriteResult::Written).map_err(write_error)
        }
    }
}

fn write_error(err: ClientError) -> SubmissionError {
    match err {
        ClientError::Forbidden(message) => {
            SubmissionError::ForbiddenTransition(ForbiddenReason::RemoteForbidden(message))
        }
        ClientError::Rejected { message, .. } => SubmissionError::RemoteWrite(message),
        other => SubmissionError::RemoteWrite(other.to_string()),
    }
}
