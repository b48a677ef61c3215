//! The onboarding form wizard state machine.
//!
//! [`FormWizard`] walks a single draft through four steps (Basic Info, Profile,
//! Address, Preview). Forward moves are gated on the current step's schema,
//! backward moves are always allowed. The profile picture upload runs out of
//! band: the wizard records a local preview immediately and merges the server
//! reference in when (and if) the latest attempt completes.
//!
//! The wizard is a plain owned value mutated through `&mut self`; callers that
//! share it serialize access themselves.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use crate::error::WizardError;
use crate::fields::{Draft, FieldName};
use crate::step::{WizardStep, TOTAL_STEPS};
use crate::submit::{ProfileSubmission, SubmitAck, SubmitService};
use crate::types::{ImageRef, UploadAttempt};
use crate::upload::{
    is_local_preview, FileHandle, UploadError, UploadOutcome, UploadService, UploadStatus,
    UploadTicket,
};
use crate::validation::evaluator::validate_field;
use crate::validation::{validate_all_steps, validate_step, ValidationContext, ValidationErrors};

// ---------------------------------------------------------------------------
// Preview edit policy
// ---------------------------------------------------------------------------

/// How in-place edits on the preview step are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewEditPolicy {
    /// Commits are written as-is; the preview step is a trusted checkpoint.
    #[default]
    Trusted,
    /// Commits re-run the owning step's schema and are refused if the edited
    /// field fails it.
    RevalidateOwningStep,
}

impl PreviewEditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trusted => "trusted",
            Self::RevalidateOwningStep => "revalidate",
        }
    }
}

impl FromStr for PreviewEditPolicy {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trusted" => Ok(Self::Trusted),
            "revalidate" => Ok(Self::RevalidateOwningStep),
            _ => Err(WizardError::InvalidSetting {
                setting: "preview_edit_policy",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Serializable view of the wizard for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub current_step: u8,
    pub step: WizardStep,
    pub step_label: &'static str,
    pub total_steps: u8,
    pub draft: Draft,
    pub upload_status: UploadStatus,
    pub uploaded_image_ref: Option<ImageRef>,
    pub display_image: Option<ImageRef>,
    pub editing: Vec<FieldName>,
}

// ---------------------------------------------------------------------------
// FormWizard
// ---------------------------------------------------------------------------

/// Linear, step-indexed onboarding wizard holding one draft.
#[derive(Debug, Clone, Default)]
pub struct FormWizard {
    current_step: WizardStep,
    draft: Draft,
    upload_status: UploadStatus,
    uploaded_image_ref: Option<ImageRef>,
    editing: BTreeSet<FieldName>,
    /// Token of the most recent upload attempt; bumped on every new attempt
    /// and on reset so older results are recognisably stale.
    latest_attempt: UploadAttempt,
    edit_policy: PreviewEditPolicy,
}

impl FormWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edit_policy(edit_policy: PreviewEditPolicy) -> Self {
        Self {
            edit_policy,
            ..Self::default()
        }
    }

    // -- Accessors --

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn field(&self, field: FieldName) -> Option<&str> {
        self.draft.get(field)
    }

    pub fn upload_status(&self) -> UploadStatus {
        self.upload_status
    }

    pub fn uploaded_image_ref(&self) -> Option<&str> {
        self.uploaded_image_ref.as_deref()
    }

    /// The image to show: the server reference once known, else the draft's
    /// local preview.
    pub fn display_image(&self) -> Option<&str> {
        self.uploaded_image_ref()
            .or_else(|| self.draft.get(FieldName::ProfilePic))
            .filter(|r| !r.is_empty())
    }

    pub fn is_editing(&self, field: FieldName) -> bool {
        self.editing.contains(&field)
    }

    pub fn edit_policy(&self) -> PreviewEditPolicy {
        self.edit_policy
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            current_step: self.current_step.to_number(),
            step: self.current_step,
            step_label: self.current_step.label(),
            total_steps: TOTAL_STEPS,
            draft: self.draft.clone(),
            upload_status: self.upload_status,
            uploaded_image_ref: self.uploaded_image_ref.clone(),
            display_image: self.display_image().map(str::to_string),
            editing: self.editing.iter().copied().collect(),
        }
    }

    // -- Navigation --

    /// Validate the current step and move forward one step.
    ///
    /// On the final step this succeeds without moving. On failure the step is
    /// unchanged and every failing field is reported.
    pub fn advance(&mut self) -> Result<WizardStep, ValidationErrors> {
        self.advance_with(&ValidationContext::today())
    }

    /// [`advance`](Self::advance) against an explicit validation context.
    pub fn advance_with(
        &mut self,
        ctx: &ValidationContext,
    ) -> Result<WizardStep, ValidationErrors> {
        let from = self.current_step;
        if let Err(errors) = validate_step(from, &self.draft, ctx) {
            tracing::debug!(
                step = from.to_number(),
                error_count = errors.len(),
                "Wizard advance blocked by validation"
            );
            return Err(errors);
        }
        self.current_step = from.next().unwrap_or(from);
        tracing::debug!(
            from_step = from.to_number(),
            to_step = self.current_step.to_number(),
            "Wizard advanced"
        );
        Ok(self.current_step)
    }

    /// Move back one step without validation. No-op on the first step.
    ///
    /// Leaving the preview step drops any field still in edit mode.
    pub fn retreat(&mut self) -> WizardStep {
        let from = self.current_step;
        self.current_step = from.previous().unwrap_or(from);
        if self.current_step != from && from.is_final() {
            self.editing.clear();
        }
        tracing::debug!(
            from_step = from.to_number(),
            to_step = self.current_step.to_number(),
            "Wizard went back"
        );
        self.current_step
    }

    // -- Draft editing --

    /// Write a field value. Nothing is validated until the next advance.
    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) {
        self.write_field(field, value.into());
    }

    /// A hand-written `profilePic` replaces whatever the last upload stored.
    fn write_field(&mut self, field: FieldName, value: String) {
        if field == FieldName::ProfilePic {
            self.uploaded_image_ref = None;
        }
        self.draft.set(field, value);
    }

    /// Toggle in-place editing of `field` on the preview step.
    ///
    /// Returns whether the field is now in edit mode.
    pub fn edit_field(&mut self, field: FieldName) -> Result<bool, WizardError> {
        self.ensure_preview(field)?;
        let editing = if self.editing.remove(&field) {
            false
        } else {
            self.editing.insert(field);
            true
        };
        Ok(editing)
    }

    /// Commit an in-place edit on the preview step and leave edit mode.
    ///
    /// Under [`PreviewEditPolicy::Trusted`] the value is written without any
    /// schema check. Under [`PreviewEditPolicy::RevalidateOwningStep`] the
    /// draft is left untouched if the edited field fails its step schema.
    pub fn commit_edit(
        &mut self,
        field: FieldName,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.commit_edit_with(field, value, &ValidationContext::today())
    }

    /// [`commit_edit`](Self::commit_edit) against an explicit validation context.
    pub fn commit_edit_with(
        &mut self,
        field: FieldName,
        value: impl Into<String>,
        ctx: &ValidationContext,
    ) -> Result<(), WizardError> {
        self.ensure_preview(field)?;
        let value = value.into();

        if self.edit_policy == PreviewEditPolicy::RevalidateOwningStep {
            let mut candidate = self.draft.clone();
            candidate.set(field, value.clone());
            if let Err(message) = validate_field(field, &candidate, ctx) {
                let mut errors = ValidationErrors::new();
                errors.add(field, message);
                return Err(errors.into());
            }
        }

        self.write_field(field, value);
        self.editing.remove(&field);
        tracing::debug!(field = %field, "Preview edit committed");
        Ok(())
    }

    fn ensure_preview(&self, field: FieldName) -> Result<(), WizardError> {
        if self.current_step.is_final() {
            Ok(())
        } else {
            Err(WizardError::NotInPreview {
                field,
                step: self.current_step.to_number(),
            })
        }
    }

    // -- Upload --

    /// Begin a new upload attempt.
    ///
    /// Synchronously marks the upload as in flight, forgets any previously
    /// uploaded reference and records a local preview reference in
    /// `profilePic`. The returned ticket is driven against an
    /// [`UploadService`] by the caller, then handed back through
    /// [`complete_upload`](Self::complete_upload).
    pub fn start_image_upload(&mut self, file: FileHandle) -> UploadTicket {
        self.latest_attempt += 1;
        self.upload_status = UploadStatus::Uploading;
        self.write_field(FieldName::ProfilePic, file.preview_ref());
        tracing::debug!(
            attempt = self.latest_attempt,
            file_name = %file.file_name,
            size_bytes = file.len(),
            "Profile picture upload started"
        );
        UploadTicket {
            attempt: self.latest_attempt,
            file,
        }
    }

    /// Fold an upload result back in.
    ///
    /// Results for anything but the latest attempt are ignored. A failure
    /// keeps the local preview in place and is not retried.
    pub fn complete_upload(
        &mut self,
        attempt: UploadAttempt,
        result: Result<ImageRef, UploadError>,
    ) -> UploadOutcome {
        if attempt != self.latest_attempt {
            tracing::debug!(
                attempt,
                latest_attempt = self.latest_attempt,
                "Discarding result of superseded upload"
            );
            return UploadOutcome::Stale;
        }

        match result {
            Ok(image_ref) if !image_ref.trim().is_empty() => {
                tracing::info!(attempt, image_ref = %image_ref, "Profile picture uploaded");
                self.upload_status = UploadStatus::Done;
                self.uploaded_image_ref = Some(image_ref);
            }
            Ok(_) => {
                tracing::warn!(attempt, "Upload service returned an empty image reference");
                self.upload_status = UploadStatus::Failed;
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "Profile picture upload failed");
                self.upload_status = UploadStatus::Failed;
            }
        }
        UploadOutcome::Applied(self.upload_status)
    }

    /// Start an upload, await `service` and fold the result back in.
    ///
    /// Convenience for callers that hold the wizard across the await.
    pub async fn run_image_upload<U: UploadService>(
        &mut self,
        file: FileHandle,
        service: &U,
    ) -> UploadOutcome {
        let ticket = self.start_image_upload(file);
        let result = service.upload_image(&ticket.file).await;
        self.complete_upload(ticket.attempt, result)
    }

    // -- Completion --

    /// Discard the draft and return to the first step.
    ///
    /// Any upload still in flight becomes stale.
    pub fn reset(&mut self) {
        self.current_step = WizardStep::BasicInfo;
        self.draft.clear();
        self.editing.clear();
        self.upload_status = UploadStatus::Idle;
        self.uploaded_image_ref = None;
        self.latest_attempt += 1;
        tracing::debug!("Wizard reset");
    }

    /// Check that the wizard can be submitted and build the record to send.
    pub fn prepare_submission(&self) -> Result<ProfileSubmission, WizardError> {
        self.prepare_submission_with(&ValidationContext::today())
    }

    /// [`prepare_submission`](Self::prepare_submission) against an explicit
    /// validation context.
    pub fn prepare_submission_with(
        &self,
        ctx: &ValidationContext,
    ) -> Result<ProfileSubmission, WizardError> {
        if !self.current_step.is_final() {
            return Err(WizardError::NotOnFinalStep(self.current_step.to_number()));
        }
        if self.upload_status == UploadStatus::Uploading {
            return Err(WizardError::UploadInProgress);
        }
        validate_all_steps(&self.draft, ctx)?;

        let image_ref = self
            .display_image()
            .filter(|r| !is_local_preview(r))
            .ok_or(WizardError::ImageNotUploaded)?
            .to_string();

        Ok(ProfileSubmission::from_draft(
            &self.draft,
            image_ref,
            chrono::Utc::now(),
        ))
    }

    /// Persist the draft through `service`, then reset.
    ///
    /// Only allowed from the preview step. The wizard is reset only after the
    /// service acknowledges; on any error the state is left untouched.
    pub async fn submit<S: SubmitService>(
        &mut self,
        service: &S,
    ) -> Result<SubmitAck, WizardError> {
        self.submit_with(service, &ValidationContext::today()).await
    }

    /// [`submit`](Self::submit) against an explicit validation context.
    pub async fn submit_with<S: SubmitService>(
        &mut self,
        service: &S,
        ctx: &ValidationContext,
    ) -> Result<SubmitAck, WizardError> {
        let submission = self.prepare_submission_with(ctx)?;
        let ack = service.submit(&submission).await.map_err(|err| {
            tracing::warn!(error = %err, "Profile submission failed");
            WizardError::from(err)
        })?;
        tracing::info!(
            reference = %ack.reference,
            username = %submission.username,
            "Profile submitted"
        );
        self.reset();
        Ok(ack)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
