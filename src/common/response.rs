// Success response envelope

use axum::Json;
use serde::Serialize;

/// JSON success envelope: `{"success": true, "data": ...}`
///
/// Error responses carry the mirrored shape with `success: false` and a
/// `message` (see `common::error::ErrorResponse`).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Success envelope carrying only a human-readable message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}
