// src/applications/handlers.rs

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::applications::models::*;
use crate::applications::validators::ApplicationValidator;
use crate::auth::{require_role, AuthedUser, Role};
use crate::common::{
    generate_application_id, is_unique_violation, ApiError, ApiResponse, AppState, MessageResponse,
    Validator,
};
use crate::services::email;

/// POST /api/jobs/:id/apply - Apply to an active job
pub async fn apply_to_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(job_id): Path<String>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::JobSeeker, Role::Student, Role::Alumni])?;

    let validator = ApplicationValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let job = sqlx::query_as::<_, (String, String, String)>(
        "SELECT poster_id, title, status FROM jobs WHERE id = ?",
    )
    .bind(&job_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?
    .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))?;

    let (poster_id, job_title, job_status) = job;

    if job_status != "active" {
        return Err(ApiError::BadRequest(
            "This job is no longer accepting applications".to_string(),
        ));
    }

    // Fast path; UNIQUE(job_id, user_id) below is the real guard.
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM applications WHERE job_id = ? AND user_id = ?",
    )
    .bind(&job_id)
    .bind(&authed.id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if existing > 0 {
        return Err(ApiError::Conflict(
            "You have already applied for this job".to_string(),
        ));
    }

    let application_id = generate_application_id();

    let insert = sqlx::query(
        r#"
        INSERT INTO applications (id, job_id, user_id, cover_letter, status, applied_at, updated_at)
        VALUES (?, ?, ?, ?, 'pending', datetime('now'), datetime('now'))
        "#,
    )
    .bind(&application_id)
    .bind(&job_id)
    .bind(&authed.id)
    .bind(request.cover_letter.as_deref())
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            return Err(ApiError::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }
        return Err(ApiError::DatabaseError(e));
    }

    // Denormalized counter. A failure here leaves the application in place
    // and the count drifting low; logged, not reconciled.
    if let Err(e) = sqlx::query(
        "UPDATE jobs SET application_count = application_count + 1, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&job_id)
    .execute(&state.db)
    .await
    {
        warn!(
            error = %e,
            job_id = %job_id,
            application_id = %application_id,
            "Application counter increment failed, count now drifts low"
        );
    }

    let application = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
        .bind(&application_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        application_id = %application_id,
        job_id = %job_id,
        "Application created"
    );

    notify_poster(&state, &poster_id, &authed.id, &job_title).await;

    Ok(ApiResponse::ok(application))
}

/// GET /api/applications - The caller's applications with job details
pub async fn get_own_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ApiResponse<Vec<ApplicationWithJob>>>, ApiError> {
    let state = state_lock.read().await.clone();

    let applications = sqlx::query_as::<_, ApplicationWithJob>(
        r#"
        SELECT
            a.id, a.job_id, a.status, a.cover_letter, a.applied_at, a.updated_at,
            j.title AS job_title, j.company AS job_company,
            j.location AS job_location, j.status AS job_status
        FROM applications a
        INNER JOIN jobs j ON a.job_id = j.id
        WHERE a.user_id = ?
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(applications))
}

/// GET /api/jobs/:id/applications - Applicants for a job (poster/admin)
pub async fn get_job_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ApplicantDetails>>>, ApiError> {
    let state = state_lock.read().await.clone();

    crate::jobs::handlers::fetch_owned_job(&state, &job_id, &authed).await?;

    let applicants = sqlx::query_as::<_, ApplicantDetails>(
        r#"
        SELECT
            a.id, a.user_id,
            u.name AS applicant_name, u.email AS applicant_email,
            a.status, a.cover_letter, a.applied_at
        FROM applications a
        INNER JOIN users u ON a.user_id = u.id
        WHERE a.job_id = ?
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(&job_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(applicants))
}

/// PATCH /api/applications/:id/status - Set an application's status
/// (job owner or admin; any status may overwrite any other)
pub async fn update_application_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateApplicationStatusRequest>,
) -> Result<Json<ApiResponse<Application>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = ApplicationValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let application =
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
            .bind(&application_id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Application not found: {}", application_id))
            })?;

    // Status changes belong to the job's poster (or an admin)
    crate::jobs::handlers::fetch_owned_job(&state, &application.job_id, &authed).await?;

    info!(
        application_id = %application_id,
        old_status = %application.status,
        new_status = %request.status,
        changed_by = %authed.id,
        "Updating application status"
    );

    sqlx::query("UPDATE applications SET status = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&request.status)
        .bind(&application_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let updated = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
        .bind(&application_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    notify_applicant(&state, &updated.user_id, &updated.job_id, &request.status).await;

    Ok(ApiResponse::ok(updated))
}

/// DELETE /api/applications/:id - Withdraw an application (owner only)
///
/// Deletes the row and decrements the job's denormalized counter, floored
/// at zero.
pub async fn withdraw_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(application_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let application =
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
            .bind(&application_id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Application not found: {}", application_id))
            })?;

    if application.user_id != authed.id {
        return Err(ApiError::Forbidden(
            "You can only withdraw your own applications".to_string(),
        ));
    }

    sqlx::query("DELETE FROM applications WHERE id = ?")
        .bind(&application_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if let Err(e) = sqlx::query(
        "UPDATE jobs SET application_count = MAX(application_count - 1, 0), updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&application.job_id)
    .execute(&state.db)
    .await
    {
        warn!(
            error = %e,
            job_id = %application.job_id,
            "Application counter decrement failed, count now drifts high"
        );
    }

    info!(
        user_id = %authed.id,
        application_id = %application_id,
        job_id = %application.job_id,
        "Application withdrawn"
    );

    Ok(MessageResponse::ok("Application withdrawn"))
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn notify_poster(state: &AppState, poster_id: &str, applicant_id: &str, job_title: &str) {
    let poster = sqlx::query_as::<_, (String, String)>("SELECT name, email FROM users WHERE id = ?")
        .bind(poster_id)
        .fetch_optional(&state.db)
        .await;

    let applicant_name =
        sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = ?")
            .bind(applicant_id)
            .fetch_optional(&state.db)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| "A candidate".to_string());

    match poster {
        Ok(Some((poster_name, poster_email))) => {
            state.email.send_detached(
                poster_email,
                format!("New application for {}", job_title),
                email::application_received_email(&poster_name, &applicant_name, job_title),
            );
        }
        Ok(None) => {
            warn!(poster_id = %poster_id, "Poster not found, skipping application email");
        }
        Err(e) => {
            warn!(error = %e, poster_id = %poster_id, "Poster lookup failed, skipping application email");
        }
    }
}

async fn notify_applicant(state: &AppState, user_id: &str, job_id: &str, status: &str) {
    let applicant =
        sqlx::query_as::<_, (String, String)>("SELECT name, email FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await;

    let job_title = sqlx::query_scalar::<_, String>("SELECT title FROM jobs WHERE id = ?")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| "a job".to_string());

    match applicant {
        Ok(Some((name, to))) => {
            state.email.send_detached(
                to,
                format!("Update on your application for {}", job_title),
                email::status_change_email(&name, &job_title, status),
            );
        }
        Ok(None) => {
            warn!(user_id = %user_id, "Applicant not found, skipping status email");
        }
        Err(e) => {
            warn!(error = %e, user_id = %user_id, "Applicant lookup failed, skipping status email");
        }
    }
}
