// src/jobs/handlers.rs

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::{require_role, AuthedUser, Role};
use crate::common::{generate_job_id, ApiError, ApiResponse, AppState, MessageResponse, Validator};
use crate::jobs::models::*;
use crate::jobs::validators::JobValidator;

/// GET /api/jobs - Public job catalog with search, filters, and pagination
pub async fn list_jobs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<JobQueryParams>,
) -> Result<Json<ApiResponse<JobListResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    // Both queries share the same WHERE clause, built once
    let mut where_clause = String::from("WHERE status = 'active'");
    let mut binds: Vec<String> = Vec::new();

    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        where_clause.push_str(" AND (title LIKE ? OR company LIKE ? OR description LIKE ?)");
        let pattern = format!("%{}%", q);
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    if let Some(location) = params
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        where_clause.push_str(" AND location LIKE ?");
        binds.push(format!("%{}%", location));
    }

    if let Some(job_type) = params.job_type.as_deref().filter(|t| !t.is_empty()) {
        where_clause.push_str(" AND job_type = ?");
        binds.push(job_type.to_string());
    }

    let count_sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = count_query.bind(bind);
    }
    let total = count_query
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let page_sql = format!(
        "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut page_query = sqlx::query_as::<_, Job>(&page_sql);
    for bind in &binds {
        page_query = page_query.bind(bind);
    }
    let jobs = page_query
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    debug!(
        job_count = jobs.len(),
        total = total,
        page = page,
        limit = limit,
        "Loaded paginated jobs list"
    );

    Ok(ApiResponse::ok(JobListResponse {
        jobs,
        total: total as usize,
        page,
        page_size: limit,
    }))
}

/// GET /api/jobs/:id - Public job detail (active jobs only)
pub async fn get_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let state = state_lock.read().await.clone();

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ? AND status = 'active'")
        .bind(&job_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))?;

    Ok(ApiResponse::ok(job))
}

/// POST /api/jobs - Create a job posting (poster/admin only)
pub async fn create_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateJob>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::JobPoster, Role::Admin])?;

    let validator = JobValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation_result.errors,
            "Job creation validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let job_id = generate_job_id();

    sqlx::query(
        r#"
        INSERT INTO jobs (id, poster_id, title, company, location, job_type,
                          salary_min, salary_max, description, status,
                          application_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'active', 0, datetime('now'), datetime('now'))
        "#,
    )
    .bind(&job_id)
    .bind(&authed.id)
    .bind(request.title.trim())
    .bind(request.company.as_deref())
    .bind(request.location.as_deref())
    .bind(request.job_type.as_deref())
    .bind(request.salary_min)
    .bind(request.salary_max)
    .bind(request.description.as_deref())
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&job_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        job_id = %job_id,
        title = %job.title,
        "Job posting created"
    );

    Ok(ApiResponse::ok(job))
}

/// PUT /api/jobs/:id - Update a job posting (owner or admin)
pub async fn update_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJob>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = JobValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let existing = fetch_owned_job(&state, &job_id, &authed).await?;

    sqlx::query(
        r#"
        UPDATE jobs
        SET title = ?, company = ?, location = ?, job_type = ?,
            salary_min = ?, salary_max = ?, description = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(request.title.as_deref().unwrap_or(&existing.title))
    .bind(request.company.as_deref().or(existing.company.as_deref()))
    .bind(request.location.as_deref().or(existing.location.as_deref()))
    .bind(request.job_type.as_deref().or(existing.job_type.as_deref()))
    .bind(request.salary_min.or(existing.salary_min))
    .bind(request.salary_max.or(existing.salary_max))
    .bind(
        request
            .description
            .as_deref()
            .or(existing.description.as_deref()),
    )
    .bind(&job_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&job_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, job_id = %job_id, "Job posting updated");

    Ok(ApiResponse::ok(job))
}

/// PATCH /api/jobs/:id/status - Open or close a posting (owner or admin)
pub async fn update_job_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobStatusRequest>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = JobValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    fetch_owned_job(&state, &job_id, &authed).await?;

    sqlx::query("UPDATE jobs SET status = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&request.status)
        .bind(&job_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&job_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        job_id = %job_id,
        status = %request.status,
        "Job status updated"
    );

    Ok(ApiResponse::ok(job))
}

/// DELETE /api/jobs/:id - Remove a posting and its applications (owner or admin)
pub async fn delete_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    fetch_owned_job(&state, &job_id, &authed).await?;

    sqlx::query("DELETE FROM applications WHERE job_id = ?")
        .bind(&job_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(&job_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, job_id = %job_id, "Job posting deleted");

    Ok(MessageResponse::ok("Job deleted"))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fetch a job and enforce owner-or-admin access for mutating operations
pub async fn fetch_owned_job(
    state: &AppState,
    job_id: &str,
    authed: &AuthedUser,
) -> Result<Job, ApiError> {
    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))?;

    if job.poster_id != authed.id && authed.role != Role::Admin {
        warn!(
            user_id = %authed.id,
            job_id = %job_id,
            "Job mutation denied: not the poster"
        );
        return Err(ApiError::Forbidden(
            "You can only manage your own job postings".to_string(),
        ));
    }

    Ok(job)
}
