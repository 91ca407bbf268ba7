//! Re-synchronizes local form state with the authoritative record after a
//! successful write.

use std::fmt;

use crate::clients::SubmissionApi;
use crate::schemas::Submission;
use crate::services::drafts::ResourceDraft;
use crate::services::form::SubmissionForm;

/// The write went through but the follow-up read did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationWarning {
    pub message: String,
}

impl fmt::Display for ReconciliationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submission saved but could not be confirmed: {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Unconfirmed(ReconciliationWarning),
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

/// Every committed resource becomes a link draft; uploaded files are only
/// addressable by link once committed.
pub fn drafts_from_submission(submission: &Submission) -> Vec<ResourceDraft> {
    let drafts: Vec<ResourceDraft> =
        submission.resources.iter().map(ResourceDraft::from_resource).collect();
    if drafts.is_empty() {
        vec![ResourceDraft::empty_link()]
    } else {
        drafts
    }
}

/// Replaces all draft state with `submission`.
pub fn apply_submission(form: &mut SubmissionForm, submission: &Submission) {
    form.drafts = drafts_from_submission(submission);
    form.comment = submission.student_comment.clone();
}

/// Back to a single empty draft.
pub fn apply_withdrawal(form: &mut SubmissionForm) {
    form.drafts = vec![ResourceDraft::empty_link()];
    form.comment = None;
}

/// Builds the edit form for a freshly loaded assignment.
pub fn prefill(assignment_id: &str, submission: Option<&Submission>) -> SubmissionForm {
    let mut form = SubmissionForm::new(assignment_id);
    if let Some(submission) = submission {
        apply_submission(&mut form, submission);
    }
    form
}

/// Re-fetches after a write. Falls back to the write response when the read
/// fails, flagging the result as unconfirmed.
pub async fn refresh_after_write(
    api: &dyn SubmissionApi,
    assignment_id: &str,
    written: Submission,
) -> (Submission, Confirmation) {
    match api.get_my_submission(assignment_id).await {
        Ok(Some(submission)) => (submission, Confirmation::Confirmed),
        Ok(None) => {
            tracing::warn!(assignment_id = %assignment_id, "Submission missing right after write");
            let warning = ReconciliationWarning {
                message: "the service did not return the saved submission".to_string(),
            };
            (written, Confirmation::Unconfirmed(warning))
        }
        Err(err) => {
            tracing::warn!(
                assignment_id = %assignment_id,
                error = %err,
                "Failed to refresh submission after write"
            );
            (written, Confirmation::Unconfirmed(ReconciliationWarning { message: err.to_string() }))
        }
    }
}
