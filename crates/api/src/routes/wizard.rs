//! Route definitions for the member onboarding wizard.
//!
//! Mounted at `/wizard-sessions` by `api_routes()`.
//!
//! ```text
//! POST   /                              create_session
//! GET    /{id}                          get_session
//! DELETE /{id}                          delete_session
//! PUT    /{id}/fields                   set_fields
//! POST   /{id}/advance                  advance
//! POST   /{id}/retreat                  retreat
//! POST   /{id}/profile-picture          upload_profile_picture (multipart)
//! POST   /{id}/fields/{field}/edit      edit_field (preview step)
//! PUT    /{id}/fields/{field}           commit_edit (preview step)
//! POST   /{id}/reset                    reset
//! POST   /{id}/submit                   submit
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::wizard;
use crate::state::AppState;

/// Wizard session routes, mounted at `/wizard-sessions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(wizard::create_session))
        .route(
            "/{id}",
            get(wizard::get_session).delete(wizard::delete_session),
        )
        .route("/{id}/fields", put(wizard::set_fields))
        .route("/{id}/advance", post(wizard::advance))
        .route("/{id}/retreat", post(wizard::retreat))
        .route(
            "/{id}/profile-picture",
            post(wizard::upload_profile_picture),
        )
        .route("/{id}/fields/{field}/edit", post(wizard::edit_field))
        .route("/{id}/fields/{field}", put(wizard::commit_edit))
        .route("/{id}/reset", post(wizard::reset))
        .route("/{id}/submit", post(wizard::submit))
}
