//! # Request and response bodies
//!
//! Every DTO derives `utoipa::ToSchema` so it shows up in the OpenAPI document.

use folio_core::settings::entity::NetworkProfile;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  Common envelopes
// ============================================================

/// Uniform response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    pub success: bool,
    /// Payload on success
    pub data: Option<T>,
    /// Message on failure
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Failure body without a payload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Always false
    pub success: bool,
    pub error: String,
}

impl ApiErrorResponse {
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  Command bodies
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VolumeRequest {
    /// 0..=100, 0 mutes
    #[schema(example = 50)]
    pub volume: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrightnessRequest {
    /// 0..=100, 0 turns the backlight off
    #[schema(example = 80)]
    pub brightness: u8,
}

/// Network profile to add or update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NetworkRequest {
    #[schema(example = "home-wifi")]
    pub ssid: String,
    #[serde(default)]
    pub secret: String,
    /// 1..=10, higher wins; out-of-range values are clamped
    #[serde(default = "default_priority")]
    #[schema(example = 5)]
    pub priority: u8,
    #[serde(default = "default_auto_connect")]
    pub auto_connect: bool,
}

fn default_priority() -> u8 {
    5
}

fn default_auto_connect() -> bool {
    true
}

impl From<NetworkRequest> for NetworkProfile {
    fn from(req: NetworkRequest) -> Self {
        NetworkProfile::new(req.ssid, req.secret, req.priority, req.auto_connect)
    }
}
