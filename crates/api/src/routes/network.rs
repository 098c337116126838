//! # Network profile routes

use axum::Json;
use axum::extract::{Path, State};
use folio_monitor::command::{Command, CommandOutcome};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, NetworkRequest};

/// Add a network profile, or update the one with the same SSID
///
/// A full table evicts the first lowest-priority profile. Link evaluation
/// restarts so the new profile is considered right away.
#[utoipa::path(
    post,
    path = "/api/v1/networks",
    tag = "Networks",
    request_body = NetworkRequest,
    responses(
        (status = 200, description = "Profile saved", body = ApiResponse<CommandOutcome>),
        (status = 400, description = "Empty SSID"),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn add_network(
    State(state): State<AppState>,
    Json(req): Json<NetworkRequest>,
) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    tracing::info!(ssid = %req.ssid, priority = req.priority, "Network profile submitted");
    let outcome = state.monitor.send(Command::AddNetwork(req.into())).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// Remove a network profile
#[utoipa::path(
    delete,
    path = "/api/v1/networks/{ssid}",
    tag = "Networks",
    params(
        ("ssid" = String, Path, description = "Profile identifier")
    ),
    responses(
        (status = 200, description = "Profile removed", body = ApiResponse<CommandOutcome>),
        (status = 404, description = "No such profile"),
        (status = 503, description = "Monitor loop not running")
    )
)]
pub async fn remove_network(
    State(state): State<AppState>,
    Path(ssid): Path<String>,
) -> Result<Json<ApiResponse<CommandOutcome>>, ApiError> {
    let outcome = state.monitor.send(Command::RemoveNetwork(ssid.clone())).await?;
    if matches!(outcome, CommandOutcome::NetworkRemoved { removed: false, .. }) {
        return Err(ApiError::NotFound(format!("No network profile named {ssid}")));
    }
    Ok(Json(ApiResponse::ok(outcome)))
}
