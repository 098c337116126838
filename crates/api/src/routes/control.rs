//! # Device control routes
//!
//! Each handler queues one command for the monitor loop and returns its
//! outcome once the loop has applied it.

use axum::Json;
use axum::extract::State;
use folio_monitor::command::{Command, CommandOutcome};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, BrightnessRequest, VolumeRequest};

async fn run(state: &AppState, command: Command) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    let outcome = state.monitor.send(command).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// Fetch both portfolios on the next tick
///
/// Offline, nothing is scheduled and the error tone plays.
#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    tag = "Control",
    responses(
        (status = 200, description = "Refresh scheduled or refused", body = ApiResponse<CommandOutcome>),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn refresh(State(state): State<AppState>) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    run(&state, Command::Refresh).await
}

/// Clear every alert latch, the active alert and the indicators
#[utoipa::path(
    post,
    path = "/api/v1/alerts/reset",
    tag = "Control",
    responses(
        (status = 200, description = "Alerts cleared", body = ApiResponse<CommandOutcome>),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn reset_alerts(State(state): State<AppState>) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    run(&state, Command::ResetAlerts).await
}

/// Flip the access-point fallback and re-run link evaluation
#[utoipa::path(
    post,
    path = "/api/v1/access-point/toggle",
    tag = "Control",
    responses(
        (status = 200, description = "New access-point setting", body = ApiResponse<CommandOutcome>),
        (status = 500, description = "Setting could not be saved"),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn toggle_access_point(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    run(&state, Command::ToggleAccessPoint).await
}

/// Set the buzzer volume
#[utoipa::path(
    put,
    path = "/api/v1/volume",
    tag = "Control",
    request_body = VolumeRequest,
    responses(
        (status = 200, description = "Volume stored, feedback tone played", body = ApiResponse<CommandOutcome>),
        (status = 500, description = "Setting could not be saved"),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn set_volume(
    State(state): State<AppState>,
    Json(req): Json<VolumeRequest>,
) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    run(&state, Command::SetVolume(req.volume)).await
}

/// Set the display brightness
#[utoipa::path(
    put,
    path = "/api/v1/display/brightness",
    tag = "Control",
    request_body = BrightnessRequest,
    responses(
        (status = 200, description = "Brightness stored", body = ApiResponse<CommandOutcome>),
        (status = 500, description = "Setting could not be saved"),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn set_brightness(
    State(state): State<AppState>,
    Json(req): Json<BrightnessRequest>,
) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    run(&state, Command::SetBrightness(req.brightness)).await
}

/// Play every tone once
#[utoipa::path(
    post,
    path = "/api/v1/self-test",
    tag = "Control",
    responses(
        (status = 200, description = "Self test played", body = ApiResponse<CommandOutcome>),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn self_test(State(state): State<AppState>) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    run(&state, Command::SelfTest).await
}
