use std::fmt;

use time::OffsetDateTime;

use crate::schemas::Submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    OnTime,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing submitted, still open.
    Pending,
    /// Nothing submitted and the due date has passed.
    Overdue,
    Submitted(Timing),
    Graded,
}

/// Derives the lifecycle state. `Late` comes from the stored `is_late` flag,
/// never from comparing `now` again.
pub fn resolve_state(
    due_date: OffsetDateTime,
    now: OffsetDateTime,
    submission: Option<&Submission>,
) -> SubmissionState {
    match submission {
        None if now > due_date => SubmissionState::Overdue,
        None => SubmissionState::Pending,
        Some(submission) if submission.is_graded() => SubmissionState::Graded,
        Some(submission) if submission.is_late => SubmissionState::Submitted(Timing::Late),
        Some(_) => SubmissionState::Submitted(Timing::OnTime),
    }
}

/// A write at `at` is late when it happens strictly after the due date.
pub fn is_late_at(due_date: OffsetDateTime, at: OffsetDateTime) -> bool {
    at > due_date
}

impl SubmissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionState::Pending => "pending",
            SubmissionState::Overdue => "overdue",
            SubmissionState::Submitted(Timing::OnTime) => "submitted_on_time",
            SubmissionState::Submitted(Timing::Late) => "submitted_late",
            SubmissionState::Graded => "graded",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
