use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::clients::{BinaryStore, ClientError, DeleteOutcome, SubmissionApi};
use crate::core::time::Clock;
use crate::schemas::{Assignment, FileType, Submission, SubmissionPayload, UploadedBinary};
use crate::services::drafts::LocalFile;

/// Serializes tests that touch process environment.
pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poison| poison.into_inner())
}

pub(crate) fn clear_config_env() {
    let keys: Vec<String> =
        std::env::vars().map(|(key, _)| key).filter(|key| key.starts_with("COURSEWORK_")).collect();
    for key in keys {
        std::env::remove_var(key);
    }
}

pub(crate) struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

pub(crate) fn pdf_file(name: &str) -> LocalFile {
    LocalFile::new(name, "application/pdf", b"%PDF-1.7\n%test\n".to_vec())
}

pub(crate) fn submission_at(submitted_at: OffsetDateTime, is_late: bool) -> Submission {
    Submission {
        id: "sub-1".to_string(),
        assignment_id: "hw-1".to_string(),
        submitted_at,
        is_late,
        student_comment: None,
        resources: Vec::new(),
        grade: None,
        feedback: None,
        graded_at: None,
    }
}

struct FakeApiState {
    now: OffsetDateTime,
    submission: Option<Submission>,
    calls: usize,
    writes: usize,
    reject_writes: Option<String>,
    fail_reads: bool,
    fail_reads_after_write: bool,
}

/// In-memory submission service enforcing the same guards as the real one.
pub(crate) struct FakeSubmissionApi {
    due_date: OffsetDateTime,
    state: Mutex<FakeApiState>,
}

impl FakeSubmissionApi {
    pub(crate) fn new(due_date: OffsetDateTime, now: OffsetDateTime) -> Self {
        Self {
            due_date,
            state: Mutex::new(FakeApiState {
                now,
                submission: None,
                calls: 0,
                writes: 0,
                reject_writes: None,
                fail_reads: false,
                fail_reads_after_write: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeApiState> {
        self.state.lock().expect("fake api state")
    }

    pub(crate) fn seed_submission(&self, submission: Submission) {
        self.state().submission = Some(submission);
    }

    pub(crate) fn current_submission(&self) -> Option<Submission> {
        self.state().submission.clone()
    }

    /// Create, amend and delete attempts.
    pub(crate) fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Every call, reads included.
    pub(crate) fn call_count(&self) -> usize {
        self.state().calls
    }

    pub(crate) fn reject_writes(&self, message: &str) {
        self.state().reject_writes = Some(message.to_string());
    }

    pub(crate) fn fail_reads(&self) {
        self.state().fail_reads = true;
    }

    pub(crate) fn fail_reads_after_write(&self) {
        self.state().fail_reads_after_write = true;
    }

    fn begin_write(&self) -> Result<MutexGuard<'_, FakeApiState>, ClientError> {
        let mut state = self.state();
        state.calls += 1;
        state.writes += 1;
        if let Some(message) = state.reject_writes.clone() {
            return Err(ClientError::Rejected { status: 409, message });
        }
        Ok(state)
    }
}

#[async_trait]
impl SubmissionApi for FakeSubmissionApi {
    async fn get_assignment(&self, assignment_id: &str) -> Result<Assignment, ClientError> {
        self.state().calls += 1;
        Ok(Assignment {
            id: assignment_id.to_string(),
            title: "Essay".to_string(),
            description: String::new(),
            due_date: self.due_date,
            max_points: 100.0,
            resources: Vec::new(),
        })
    }

    async fn get_my_submission(
        &self,
        _assignment_id: &str,
    ) -> Result<Option<Submission>, ClientError> {
        let mut state = self.state();
        state.calls += 1;
        if state.fail_reads || (state.fail_reads_after_write && state.writes > 0) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        Ok(state.submission.clone())
    }

    async fn create_submission(
        &self,
        assignment_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, ClientError> {
        let mut state = self.begin_write()?;
        let submission = Submission {
            id: "sub-1".to_string(),
            assignment_id: assignment_id.to_string(),
            submitted_at: state.now,
            is_late: state.now > self.due_date,
            student_comment: payload.comment.clone(),
            resources: payload.resources.clone(),
            grade: None,
            feedback: None,
            graded_at: None,
        };
        state.submission = Some(submission.clone());
        Ok(submission)
    }

    async fn amend_submission(
        &self,
        _assignment_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, ClientError> {
        let mut state = self.begin_write()?;
        let now = state.now;
        let submission = state.submission.as_mut().ok_or(ClientError::NotFound)?;
        if submission.is_graded() {
            return Err(ClientError::Forbidden("Submission already graded".to_string()));
        }
        submission.submitted_at = now;
        submission.student_comment = payload.comment.clone();
        submission.resources = payload.resources.clone();
        Ok(submission.clone())
    }

    async fn delete_submission(&self, _assignment_id: &str) -> Result<DeleteOutcome, ClientError> {
        let mut state = self.begin_write()?;
        let past_due = state.now > self.due_date;
        let graded = state.submission.as_ref().ok_or(ClientError::NotFound)?.is_graded();
        if graded || past_due {
            return Ok(DeleteOutcome::Forbidden(
                "Submission can no longer be withdrawn".to_string(),
            ));
        }
        state.submission = None;
        Ok(DeleteOutcome::Deleted)
    }
}

/// In-memory binary store that hands back predictable links.
#[derive(Default)]
pub(crate) struct FakeBinaryStore {
    fail_on: Option<String>,
    attempts: AtomicUsize,
}

impl FakeBinaryStore {
    pub(crate) fn failing_on(file_name: &str) -> Self {
        Self { fail_on: Some(file_name.to_string()), attempts: AtomicUsize::new(0) }
    }

    /// Every `upload_binary` call, failed ones included.
    pub(crate) fn upload_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BinaryStore for FakeBinaryStore {
    async fn upload_binary(&self, file: &LocalFile) -> Result<UploadedBinary, ClientError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.as_deref() == Some(file.file_name.as_str()) {
            return Err(ClientError::Rejected { status: 500, message: "storage unavailable".into() });
        }
        let file_type = file
            .extension()
            .and_then(|ext| FileType::from_extension(&ext))
            .ok_or_else(|| ClientError::InvalidInput(file.file_name.clone()))?;

        Ok(UploadedBinary {
            resource_link: format!("https://files.example.com/{}", file.file_name),
            title: file.file_name.clone(),
            file_type,
        })
    }
}
