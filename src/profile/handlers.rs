// src/profile/handlers.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::models::{User, UserResponse};
use crate::auth::AuthedUser;
use crate::common::{
    is_unique_violation, is_valid_email, safe_email_log, ApiError, ApiResponse, AppState,
    ValidationResult,
};
use crate::profile::models::UpdateProfileRequest;

/// GET /api/profile - The caller's profile
pub async fn get_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(user.into()))
}

/// PUT /api/profile - Update name and/or email
pub async fn update_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let mut result = ValidationResult::new();
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            result.add_error("name", "Name cannot be blank");
        } else if name.len() > 100 {
            result.add_error("name", "Name must be less than 100 characters");
        }
    }
    if let Some(email) = &request.email {
        if !is_valid_email(email) {
            result.add_error("email", "A valid email address is required");
        }
    }
    if !result.is_valid {
        return Err(ApiError::from(result));
    }

    let current = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&current.name);
    let email = request
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|| current.email.clone());

    let update = sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
        .bind(name)
        .bind(&email)
        .bind(&authed.id)
        .execute(&state.db)
        .await;

    if let Err(e) = update {
        if is_unique_violation(&e) {
            warn!(
                user_id = %authed.id,
                email = %safe_email_log(&email),
                "Profile update rejected: email already in use"
            );
            return Err(ApiError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        return Err(ApiError::DatabaseError(e));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, "Profile updated");

    Ok(ApiResponse::ok(user.into()))
}
