//! End-to-end submission operations: guard, validate, read, decide, upload,
//! write, reconcile.

use crate::core::state::AppState;
use crate::errors::SubmissionError;
use crate::schemas::{Assignment, Submission, SubmissionPayload};
use crate::services::form::SubmissionForm;
use crate::services::reconciliation::{self, Confirmation};
use crate::services::submission_state::{resolve_state, SubmissionState};
use crate::services::transitions::{self, decide, Intent, Operation, WriteResult};
use crate::services::upload_orchestrator::{plan_commit, CommitPlan};

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionView {
    pub assignment: Assignment,
    pub submission: Option<Submission>,
    pub state: SubmissionState,
    pub form: SubmissionForm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReport {
    pub operation: Operation,
    /// Authoritative record after the write; `None` after a withdrawal.
    pub submission: Option<Submission>,
    pub state: SubmissionState,
    pub is_late: bool,
    pub confirmation: Confirmation,
}

/// The form always comes back, whatever happened to the operation.
#[derive(Debug)]
pub struct FlowResult {
    pub form: SubmissionForm,
    pub outcome: Result<TransitionReport, SubmissionError>,
}

pub async fn load(state: &AppState, assignment_id: &str) -> Result<SubmissionView, SubmissionError> {
    let (assignment, submission) = read_current(state, assignment_id).await?;
    let now = state.clock().now();
    let resolved = resolve_state(assignment.due_date, now, submission.as_ref());
    let form = reconciliation::prefill(assignment_id, submission.as_ref());

    Ok(SubmissionView { assignment, submission, state: resolved, form })
}

pub async fn submit(state: &AppState, form: SubmissionForm) -> FlowResult {
    run(state, form, Intent::Submit).await
}

pub async fn resubmit(state: &AppState, form: SubmissionForm) -> FlowResult {
    run(state, form, Intent::Resubmit).await
}

pub async fn withdraw(state: &AppState, form: SubmissionForm) -> FlowResult {
    run(state, form, Intent::Withdraw).await
}

async fn run(state: &AppState, mut form: SubmissionForm, intent: Intent) -> FlowResult {
    let assignment_id = form.assignment_id.clone();

    if form.is_in_flight() {
        return FlowResult { form, outcome: Err(SubmissionError::InFlight(assignment_id)) };
    }
    let Some(_guard) = state.try_begin(&assignment_id) else {
        tracing::warn!(assignment_id = %assignment_id, "Operation already in progress");
        return FlowResult { form, outcome: Err(SubmissionError::InFlight(assignment_id)) };
    };

    form.set_in_flight(true);
    let outcome = transition(state, &mut form, intent).await;
    form.set_in_flight(false);

    match &outcome {
        Ok(report) => {
            metrics::counter!(
                "submission_transitions_total",
                "operation" => report.operation.as_str(),
                "status" => "success"
            )
            .increment(1);
            tracing::info!(
                assignment_id = %assignment_id,
                operation = report.operation.as_str(),
                state = %report.state,
                is_late = report.is_late,
                confirmed = report.confirmation.is_confirmed(),
                "Submission transition completed"
            );
        }
        Err(err) => {
            metrics::counter!(
                "submission_transitions_total",
                "operation" => intent_label(intent),
                "status" => err.kind()
            )
            .increment(1);
            tracing::warn!(
                assignment_id = %assignment_id,
                intent = intent_label(intent),
                error = %err,
                "Submission transition failed"
            );
        }
    }

    FlowResult { form, outcome }
}

async fn transition(
    state: &AppState,
    form: &mut SubmissionForm,
    intent: Intent,
) -> Result<TransitionReport, SubmissionError> {
    let assignment_id = form.assignment_id.clone();

    // Drafts are checked before anything touches the network.
    let commit: Option<CommitPlan> = match intent {
        Intent::Withdraw => None,
        Intent::Submit | Intent::Resubmit => Some(plan_commit(&form.drafts, state.upload_policy())?),
    };

    let (assignment, current) = read_current(state, &assignment_id).await?;
    let plan = decide(intent, assignment.due_date, state.clock().now(), current.as_ref());
    let operation = plan.permitted()?;

    let committed = match commit {
        Some(commit) => Some(commit.execute(state.store()).await?),
        None => None,
    };
    let payload = committed
        .as_ref()
        .map(|committed| SubmissionPayload::new(form.comment.clone(), committed.resources.clone()));

    let written = match transitions::execute(state.api(), &assignment_id, &plan, payload.as_ref()).await
    {
        Ok(written) => written,
        Err(err) => {
            if let Some(committed) = &committed {
                form.mark_uploaded(&committed.uploaded);
            }
            return Err(err);
        }
    };

    match written {
        WriteResult::Withdrawn => {
            reconciliation::apply_withdrawal(form);
            let resolved = resolve_state(assignment.due_date, state.clock().now(), None);
            Ok(TransitionReport {
                operation,
                submission: None,
                state: resolved,
                is_late: false,
                confirmation: Confirmation::Confirmed,
            })
        }
        WriteResult::Written(written) => {
            let (submission, confirmation) =
                reconciliation::refresh_after_write(state.api(), &assignment_id, written).await;

            if let Some(expected) = plan.expected_late() {
                if expected != submission.is_late {
                    tracing::warn!(
                        assignment_id = %assignment_id,
                        expected,
                        stored = submission.is_late,
                        "Stored lateness differs from the write decision"
                    );
                }
            }

            reconciliation::apply_submission(form, &submission);
            let resolved =
                resolve_state(assignment.due_date, state.clock().now(), Some(&submission));
            Ok(TransitionReport {
                operation,
                is_late: submission.is_late,
                submission: Some(submission),
                state: resolved,
                confirmation,
            })
        }
    }
}

/// Both reads run together and must both finish before any decision.
async fn read_current(
    state: &AppState,
    assignment_id: &str,
) -> Result<(Assignment, Option<Submission>), SubmissionError> {
    let api = state.api();
    tokio::try_join!(api.get_assignment(assignment_id), api.get_my_submission(assignment_id))
        .map_err(|err| SubmissionError::Fetch(err.to_string()))
}

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::Submit => "submit",
        Intent::Resubmit => "resubmit",
        Intent::Withdraw => "withdraw",
    }
}
