// src/admin/handlers.rs

use axum::extract::{Extension, Json, Path, Query};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::admin::models::*;
use crate::auth::models::{Role, User, UserResponse};
use crate::auth::{require_role, AuthedUser};
use crate::common::{
    is_valid_entity_id, ApiError, ApiResponse, AppState, MessageResponse, ValidationResult,
};

/// GET /api/admin/stats - Aggregate counts for the admin console
pub async fn get_admin_stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ApiResponse<AdminStats>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::Admin])?;

    let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let role_counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT role, COUNT(*) as count FROM users GROUP BY role",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let users_by_role: HashMap<String, i64> = role_counts.into_iter().collect();

    let total_jobs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let active_jobs =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs WHERE status = 'active'")
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    let total_applications = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let status_counts = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) as count FROM applications GROUP BY status",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let applications_by_status: HashMap<String, i64> = status_counts.into_iter().collect();

    let total_chapters = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chapters")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let total_interview_practices =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM interview_practices")
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    info!(admin_user_id = %authed.id, "Admin stats computed");

    Ok(ApiResponse::ok(AdminStats {
        total_users,
        users_by_role,
        total_jobs,
        active_jobs,
        total_applications,
        applications_by_status,
        total_chapters,
        total_interview_practices,
    }))
}

/// GET /api/admin/users - Paginated user list
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(params): Query<UserListParams>,
) -> Result<Json<ApiResponse<UserListResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::Admin])?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit as i64)
    .bind(offset as i64)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let users: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();

    Ok(ApiResponse::ok(UserListResponse {
        users,
        total: total as usize,
        page,
        page_size: limit,
    }))
}

/// PATCH /api/admin/users/:id/role - Set a user's role
pub async fn update_user_role(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::Admin])?;

    if !is_valid_entity_id(&user_id) {
        return Err(ApiError::BadRequest("Malformed user id".to_string()));
    }

    if Role::parse(&request.role).is_none() {
        let mut result = ValidationResult::new();
        result.add_error("role", "Unknown role");
        return Err(ApiError::from(result));
    }

    let updated = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(&request.role)
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        admin_user_id = %authed.id,
        user_id = %user_id,
        role = %request.role,
        "User role updated"
    );

    Ok(ApiResponse::ok(user.into()))
}

/// DELETE /api/admin/users/:id - Delete a user and their owned rows
///
/// Practice rows, applications, memberships, and reset tokens cascade.
/// Denormalized job counters for the deleted applications are not adjusted;
/// the drift is accepted.
pub async fn delete_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::Admin])?;

    if !is_valid_entity_id(&user_id) {
        return Err(ApiError::BadRequest("Malformed user id".to_string()));
    }

    if user_id == authed.id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if exists == 0 {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    for table in [
        "interview_practices",
        "applications",
        "chapter_members",
        "password_reset_tokens",
    ] {
        if let Err(e) = sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
            .bind(&user_id)
            .execute(&state.db)
            .await
        {
            warn!(error = %e, table = %table, user_id = %user_id, "Cascade delete failed");
            return Err(ApiError::DatabaseError(e));
        }
    }

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        admin_user_id = %authed.id,
        user_id = %user_id,
        "User deleted with cascades"
    );

    Ok(MessageResponse::ok("User deleted"))
}
