pub mod drafts;
pub mod form;
pub mod reconciliation;
pub mod submission_flow;
pub mod submission_state;
pub mod transitions;
pub mod upload_orchestrator;
pub mod upload_policy;
