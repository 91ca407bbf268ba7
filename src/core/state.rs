use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::clients::{BinaryStore, SubmissionApi};
use crate::core::time::Clock;
use crate::services::upload_policy::UploadPolicy;

/// Shared handles every submission operation runs against.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    api: Arc<dyn SubmissionApi>,
    store: Arc<dyn BinaryStore>,
    clock: Arc<dyn Clock>,
    upload_policy: UploadPolicy,
    in_flight: Mutex<HashSet<String>>,
}

impl AppState {
    pub fn new(
        api: Arc<dyn SubmissionApi>,
        store: Arc<dyn BinaryStore>,
        clock: Arc<dyn Clock>,
        upload_policy: UploadPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                api,
                store,
                clock,
                upload_policy,
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn api(&self) -> &dyn SubmissionApi {
        self.inner.api.as_ref()
    }

    pub fn store(&self) -> &dyn BinaryStore {
        self.inner.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.inner.upload_policy
    }

    /// Marks `assignment_id` busy. Returns `None` when an operation for the
    /// same assignment is already running in this process.
    pub(crate) fn try_begin(&self, assignment_id: &str) -> Option<InFlightGuard> {
        let mut busy = self.inner.in_flight.lock().unwrap_or_else(|poison| poison.into_inner());
        if !busy.insert(assignment_id.to_string()) {
            return None;
        }
        Some(InFlightGuard { state: self.clone(), assignment_id: assignment_id.to_string() })
    }
}

/// Releases the in-flight slot on drop.
pub(crate) struct InFlightGuard {
    state: AppState,
    assignment_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut busy =
            self.state.inner.in_flight.lock().unwrap_or_else(|poison| poison.into_inner());
        busy.remove(&self.assignment_id);
    }
}
