use uuid::Uuid;

use crate::schemas::Resource;
use crate::services::drafts::ResourceDraft;

/// Client-held form state for one assignment. Passed into every operation by
/// value and handed back updated.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    pub assignment_id: String,
    pub drafts: Vec<ResourceDraft>,
    pub comment: Option<String>,
    in_flight: bool,
}

impl SubmissionForm {
    /// A fresh form holding one empty link slot.
    pub fn new(assignment_id: impl Into<String>) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            drafts: vec![ResourceDraft::empty_link()],
            comment: None,
            in_flight: false,
        }
    }

    pub fn with_drafts(mut self, drafts: Vec<ResourceDraft>) -> Self {
        self.drafts = drafts;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn set_in_flight(&mut self, value: bool) {
        self.in_flight = value;
    }

    pub fn add_draft(&mut self, draft: ResourceDraft) -> Uuid {
        let id = draft.id();
        self.drafts.push(draft);
        id
    }

    /// Removes a draft; the form always keeps at least one slot.
    pub fn remove_draft(&mut self, draft_id: Uuid) -> Option<ResourceDraft> {
        let index = self.drafts.iter().position(|draft| draft.id() == draft_id)?;
        let removed = self.drafts.remove(index);
        if self.drafts.is_empty() {
            self.drafts.push(ResourceDraft::empty_link());
        }
        Some(removed)
    }

    pub fn draft_mut(&mut self, draft_id: Uuid) -> Option<&mut ResourceDraft> {
        self.drafts.iter_mut().find(|draft| draft.id() == draft_id)
    }

    /// Freezes file drafts whose upload already succeeded.
    pub(crate) fn mark_uploaded(&mut self, uploaded: &[(Uuid, Resource)]) {
        for (draft_id, resource) in uploaded {
            if let Some(draft) = self.draft_mut(*draft_id) {
                draft.mark_uploaded(resource.clone());
            }
        }
    }
}
