pub mod assignment;
pub mod resource;
pub mod submission;

pub use assignment::Assignment;
pub use resource::{FileType, Resource};
pub use submission::{Submission, SubmissionPayload, UploadedBinary};
