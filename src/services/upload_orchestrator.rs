//! Turns drafts into committed resources: link drafts pass straight through,
//! file drafts are uploaded in parallel and joined atomically.

use futures::future::try_join_all;
use uuid::Uuid;

use crate::clients::BinaryStore;
use crate::errors::SubmissionError;
use crate::schemas::{FileType, Resource};
use crate::services::drafts::{DraftKind, LocalFile, ResourceDraft};
use crate::services::upload_policy::UploadPolicy;

#[derive(Debug)]
pub struct PendingUpload {
    pub draft_id: Uuid,
    pub file: LocalFile,
    pub file_type: FileType,
}

/// Drafts partitioned and checked; no network call has happened yet.
#[derive(Debug)]
pub struct CommitPlan {
    ready: Vec<Resource>,
    to_upload: Vec<PendingUpload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommittedResources {
    /// Ready resources first, then uploads in draft order.
    pub resources: Vec<Resource>,
    /// Which draft produced which uploaded resource.
    pub uploaded: Vec<(Uuid, Resource)>,
}

/// Partitions `drafts` and validates every one of them.
///
/// Blank slots are skipped. A half-filled link or a file outside the upload
/// policy fails the whole commit.
pub fn plan_commit(
    drafts: &[ResourceDraft],
    policy: &UploadPolicy,
) -> Result<CommitPlan, SubmissionError> {
    let mut ready = Vec::new();
    let mut to_upload = Vec::new();

    for draft in drafts.iter().filter(|draft| !draft.is_blank()) {
        match draft.kind() {
            DraftKind::Link { .. } => ready.push(draft.validate_link()?),
            DraftKind::Uploaded(resource) => ready.push(resource.clone()),
            DraftKind::File(Some(file)) => {
                let file_type = policy.check(draft.id(), file)?;
                to_upload.push(PendingUpload { draft_id: draft.id(), file: file.clone(), file_type });
            }
            DraftKind::File(None) => {}
        }
    }

    if ready.is_empty() && to_upload.is_empty() {
        return Err(SubmissionError::validation("attach at least one link or file"));
    }

    Ok(CommitPlan { ready, to_upload })
}

impl CommitPlan {
    pub fn ready(&self) -> &[Resource] {
        &self.ready
    }

    pub fn to_upload(&self) -> &[PendingUpload] {
        &self.to_upload
    }

    /// Uploads every pending file concurrently. The first failure fails the
    /// whole commit and no partial list is returned.
    pub async fn execute(self, store: &dyn BinaryStore) -> Result<CommittedResources, SubmissionError> {
        let uploads = self.to_upload.iter().map(|pending| async move {
            match store.upload_binary(&pending.file).await {
                Ok(binary) => {
                    metrics::counter!("uploads_total", "status" => "success").increment(1);
                    tracing::debug!(
                        draft_id = %pending.draft_id,
                        file_type = %binary.file_type,
                        "Draft uploaded"
                    );
                    Ok((pending.draft_id, Resource::from(binary)))
                }
                Err(err) => {
                    metrics::counter!("uploads_total", "status" => "failed").increment(1);
                    tracing::warn!(
                        draft_id = %pending.draft_id,
                        file_name = %pending.file.file_name,
                        error = %err,
                        "Draft upload failed"
                    );
                    Err(SubmissionError::upload(pending.draft_id, err))
                }
            }
        });

        let uploaded = try_join_all(uploads).await?;

        let mut resources = self.ready;
        resources.extend(uploaded.iter().map(|(_, resource)| resource.clone()));

        Ok(CommittedResources { resources, uploaded })
    }
}

pub async fn commit_drafts(
    drafts: &[ResourceDraft],
    policy: &UploadPolicy,
    store: &dyn BinaryStore,
) -> Result<CommittedResources, SubmissionError> {
    plan_commit(drafts, policy)?.execute(store).await
}
