//! Handlers for the member onboarding wizard.
//!
//! Every request is one discrete wizard event applied to the session's
//! [`FormWizard`](onboard_core::FormWizard) under its lock. The profile
//! picture upload is the only long-running event: the handler records the
//! attempt, answers immediately and finishes the upload in a background task.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use onboard_core::submit::SubmitAck;
use onboard_core::upload::{FileHandle, UploadService};
use onboard_core::{FieldName, FormWizard, WizardSnapshot};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::sessions::SessionHandle;
use crate::state::AppState;

/// Multipart part carrying the profile picture.
pub const PROFILE_PICTURE_PART: &str = "file";

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Batch of draft values keyed by wire field name.
#[derive(Debug, Deserialize)]
pub struct SetFieldsRequest {
    pub fields: BTreeMap<String, String>,
}

/// New value for a field being edited in place on the preview step.
#[derive(Debug, Deserialize)]
pub struct CommitEditRequest {
    pub value: String,
}

/// A session id together with its wizard state.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub wizard: WizardSnapshot,
}

impl SessionResponse {
    fn new(id: Uuid, wizard: &FormWizard) -> Self {
        Self {
            id,
            wizard: wizard.snapshot(),
        }
    }
}

/// Acknowledgement of a submitted profile and the reset session.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub ack: SubmitAck,
    pub session: SessionResponse,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a session, returning 404 if it does not exist.
async fn find_session(state: &AppState, id: Uuid) -> AppResult<SessionHandle> {
    state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound(id))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions
// ---------------------------------------------------------------------------

/// Start a new wizard on the first step with an empty draft.
pub async fn create_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let (id, handle) = state
        .sessions
        .create(state.config.preview_edit_policy)
        .await;
    let wizard = handle.lock().await;

    tracing::info!(
        session_id = %id,
        edit_policy = wizard.edit_policy().as_str(),
        "Wizard session created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionResponse::new(id, &wizard),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /wizard-sessions/{id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, id).await?;
    let wizard = handle.lock().await;
    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// DELETE /wizard-sessions/{id}
// ---------------------------------------------------------------------------

/// Discard a session and its draft.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.sessions.remove(id).await {
        return Err(AppError::SessionNotFound(id));
    }
    tracing::info!(session_id = %id, "Wizard session discarded");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// PUT /wizard-sessions/{id}/fields
// ---------------------------------------------------------------------------

/// Write a batch of draft values without validating them.
///
/// Every field name is checked before anything is written, so an unknown
/// name leaves the draft untouched.
pub async fn set_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetFieldsRequest>,
) -> AppResult<impl IntoResponse> {
    let updates = body
        .fields
        .into_iter()
        .map(|(name, value)| name.parse::<FieldName>().map(|field| (field, value)))
        .collect::<Result<Vec<_>, _>>()?;

    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    let count = updates.len();
    for (field, value) in updates {
        wizard.set_field(field, value);
    }

    tracing::debug!(session_id = %id, count, "Draft fields updated");

    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/advance
// ---------------------------------------------------------------------------

/// Validate the current step and move forward.
///
/// Field errors are returned as 422 with a `fields` map; the step is left
/// unchanged.
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    let from = wizard.current_step();

    let to = wizard.advance().map_err(|errors| {
        tracing::debug!(
            session_id = %id,
            step = from.to_number(),
            error_count = errors.len(),
            "Wizard step failed validation"
        );
        AppError::from(errors)
    })?;

    tracing::info!(
        session_id = %id,
        from_step = from.to_number(),
        to_step = to.to_number(),
        "Wizard session advanced"
    );

    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/retreat
// ---------------------------------------------------------------------------

pub async fn retreat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    let from = wizard.current_step();
    let to = wizard.retreat();

    tracing::info!(
        session_id = %id,
        from_step = from.to_number(),
        to_step = to.to_number(),
        "Wizard session went back"
    );

    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/profile-picture
// ---------------------------------------------------------------------------

/// Accept a profile picture and start uploading it.
///
/// Responds `202 Accepted` as soon as the local preview is recorded. The
/// upload itself runs in a spawned task that re-acquires the session lock to
/// fold its result in; results of superseded attempts are discarded by the
/// wizard.
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, id).await?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(PROFILE_PICTURE_PART) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some(FileHandle::new(file_name, content_type, bytes.to_vec()));
        break;
    }

    let file = file.ok_or_else(|| {
        AppError::BadRequest(format!(
            "Multipart body must contain a '{PROFILE_PICTURE_PART}' file part"
        ))
    })?;

    let (ticket, response) = {
        let mut wizard = handle.lock().await;
        let ticket = wizard.start_image_upload(file);
        (ticket, SessionResponse::new(id, &wizard))
    };

    tracing::info!(
        session_id = %id,
        attempt = ticket.attempt,
        file_name = %ticket.file.file_name,
        size_bytes = ticket.file.len(),
        "Profile picture upload accepted"
    );

    let images = Arc::clone(&state.images);
    tokio::spawn(async move {
        let result = images.upload_image(&ticket.file).await;
        let outcome = handle.lock().await.complete_upload(ticket.attempt, result);
        tracing::info!(
            session_id = %id,
            attempt = ticket.attempt,
            ?outcome,
            "Profile picture upload finished"
        );
    });

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: response })))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/fields/{field}/edit
// ---------------------------------------------------------------------------

/// Toggle in-place editing of a field on the preview step.
pub async fn edit_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
) -> AppResult<impl IntoResponse> {
    let field: FieldName = field.parse()?;
    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    let editing = wizard.edit_field(field)?;

    tracing::debug!(session_id = %id, field = %field, editing, "Preview edit toggled");

    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// PUT /wizard-sessions/{id}/fields/{field}
// ---------------------------------------------------------------------------

/// Commit an in-place edit on the preview step.
pub async fn commit_edit(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
    Json(body): Json<CommitEditRequest>,
) -> AppResult<impl IntoResponse> {
    let field: FieldName = field.parse()?;
    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    wizard.commit_edit(field, body.value)?;

    tracing::info!(session_id = %id, field = %field, "Preview edit committed");

    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/reset
// ---------------------------------------------------------------------------

/// Discard the draft and return to the first step.
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    wizard.reset();

    tracing::info!(session_id = %id, "Wizard session reset");

    Ok(Json(DataResponse {
        data: SessionResponse::new(id, &wizard),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/submit
// ---------------------------------------------------------------------------

/// Persist the completed profile, then reset the session.
///
/// The session lock is held across the submission so no edit can slip in
/// between validation and persistence.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let handle = find_session(&state, id).await?;
    let mut wizard = handle.lock().await;
    let ack = wizard.submit(state.submissions.as_ref()).await?;

    tracing::info!(
        session_id = %id,
        reference = %ack.reference,
        "Wizard session submitted"
    );

    Ok(Json(DataResponse {
        data: SubmitResponse {
            ack,
            session: SessionResponse::new(id, &wizard),
        },
    }))
}
