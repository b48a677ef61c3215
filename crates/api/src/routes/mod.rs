pub mod health;
pub mod wizard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /wizard-sessions                                  create (POST)
/// /wizard-sessions/{id}                             get, discard (GET, DELETE)
/// /wizard-sessions/{id}/fields                      batch set draft values (PUT)
/// /wizard-sessions/{id}/advance                     validated step forward (POST)
/// /wizard-sessions/{id}/retreat                     step back (POST)
/// /wizard-sessions/{id}/profile-picture             start image upload (POST, multipart)
/// /wizard-sessions/{id}/fields/{field}/edit         toggle preview edit (POST)
/// /wizard-sessions/{id}/fields/{field}              commit preview edit (PUT)
/// /wizard-sessions/{id}/reset                       discard draft (POST)
/// /wizard-sessions/{id}/submit                      persist and reset (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/wizard-sessions", wizard::router())
}
