use crate::fields::FieldName;
use crate::submit::SubmitError;
use crate::validation::ValidationErrors;

/// Errors surfaced by wizard operations.
///
/// None of these are fatal: the wizard stays usable after every one of them
/// and the caller is expected to display the message and let the user retry.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Invalid step number {0}. Must be between 1 and 4")]
    InvalidStep(u8),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{field}' can only be edited in place on the preview step (currently on step {step})")]
    NotInPreview { field: FieldName, step: u8 },

    #[error("Submission is only possible from the preview step (currently on step {0})")]
    NotOnFinalStep(u8),

    #[error("Profile picture upload is still in progress")]
    UploadInProgress,

    #[error("Profile picture has not been uploaded to the server")]
    ImageNotUploaded,

    #[error("Invalid value '{value}' for setting '{setting}'")]
    InvalidSetting { setting: &'static str, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
