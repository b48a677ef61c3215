use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use onboard_core::validation::ValidationErrors;
use onboard_core::WizardError;
use serde_json::json;
use uuid::Uuid;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`WizardError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `onboard_core`.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// No wizard session is registered under this id.
    #[error("Wizard session {0} not found")]
    SessionNotFound(Uuid),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Wizard(WizardError::Validation(errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;

        let (status, code, message) = match &self {
            // --- WizardError variants ---
            AppError::Wizard(wizard) => match wizard {
                WizardError::Validation(errors) => {
                    fields = serde_json::to_value(errors).ok();
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "VALIDATION_ERROR",
                        errors.to_string(),
                    )
                }
                WizardError::UnknownField(_) | WizardError::InvalidStep(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", wizard.to_string())
                }
                WizardError::NotInPreview { .. }
                | WizardError::NotOnFinalStep(_)
                | WizardError::UploadInProgress
                | WizardError::ImageNotUploaded => {
                    (StatusCode::CONFLICT, "CONFLICT", wizard.to_string())
                }
                WizardError::Submit(err) => {
                    tracing::warn!(error = %err, "Submission collaborator failed");
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
                }
                WizardError::InvalidSetting { .. } => {
                    tracing::error!(error = %wizard, "Invalid wizard setting");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::SessionNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = fields;
        }

        (status, axum::Json(body)).into_response()
    }
}
