//! Submission of a completed draft to the persistence collaborator.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::fields::Draft;
use crate::types::{ImageRef, Timestamp};

/// The typed record handed to a [`SubmitService`].
///
/// Built from a draft that has passed every step schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSubmission {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub mobile: String,
    pub gender: String,
    pub profile_pic: ImageRef,
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub submitted_at: Timestamp,
}

impl ProfileSubmission {
    /// Assemble a submission from a draft. Values are trimmed; an empty bio
    /// becomes `None`.
    pub fn from_draft(draft: &Draft, profile_pic: ImageRef, submitted_at: Timestamp) -> Self {
        let text = |value: &str| value.trim().to_string();
        let bio = Some(text(draft.bio())).filter(|b| !b.is_empty());
        Self {
            full_name: text(draft.full_name()),
            username: text(draft.username()),
            email: text(draft.email()),
            mobile: text(draft.mobile()),
            gender: text(draft.gender()),
            profile_pic,
            date_of_birth: text(draft.date_of_birth()),
            bio,
            address_line: text(draft.address_line()),
            city: text(draft.city()),
            state: text(draft.state()),
            country: text(draft.country()),
            postal_code: text(draft.postal_code()),
            submitted_at,
        }
    }
}

/// Acknowledgement returned once a submission is durably stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAck {
    /// Identifier assigned by the persistence side.
    pub reference: String,
    pub received_at: Timestamp,
}

/// Errors reported by a [`SubmitService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The persistence side could not be reached or failed to store the record.
    #[error("Submission failed: {0}")]
    Network(String),

    /// The persistence side refused the record.
    #[error("Submission rejected: {0}")]
    Rejected(String),
}

/// Persists a completed profile.
pub trait SubmitService: Send + Sync {
    fn submit(
        &self,
        submission: &ProfileSubmission,
    ) -> impl Future<Output = Result<SubmitAck, SubmitError>> + Send;
}
