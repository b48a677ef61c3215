//! Concrete collaborators the wizard sessions are driven against.

pub mod image_store;
pub mod submission;

pub use image_store::{LocalImageStore, UPLOADS_ROUTE};
pub use submission::SubmissionSink;
