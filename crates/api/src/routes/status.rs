//! # Status route
//!
//! Serves the report the monitor loop published last; never waits on the loop.

use axum::Json;
use axum::extract::State;
use folio_monitor::report::StatusReport;

use crate::server::AppState;
use crate::types::ApiResponse;

/// Current monitor status
///
/// Connectivity, per-mode summaries, fetch statistics, the active alert and
/// the most recent alert journal entries.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "Status",
    responses(
        (status = 200, description = "Last published status", body = ApiResponse<StatusReport>)
    )
)]
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StatusReport>> {
    Json(ApiResponse::ok(state.monitor.status()))
}
