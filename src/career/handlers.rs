// src/career/handlers.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::AuthedUser;
use crate::career::models::*;
use crate::career::scoring::{
    analyze_interview_response, analyze_resume, confidence_pulse, InterviewAnalysis,
    ResumeAnalysis,
};
use crate::common::{generate_practice_id, ApiError, ApiResponse, AppState, ValidationResult};

/// POST /api/career/resume-score - Score a resume text
///
/// Stateless: nothing is persisted, the result is a pure function of the
/// input text.
pub async fn score_resume(
    authed: AuthedUser,
    Json(request): Json<ResumeScoreRequest>,
) -> Result<Json<ApiResponse<ResumeAnalysis>>, ApiError> {
    let trimmed = request.resume_text.trim();

    if trimmed.chars().count() < 20 {
        let mut result = ValidationResult::new();
        result.add_error(
            "resume_text",
            "Resume text must be at least 20 characters long",
        );
        return Err(ApiError::from(result));
    }

    let analysis = analyze_resume(trimmed);

    debug!(
        user_id = %authed.id,
        score = analysis.score,
        keyword_count = analysis.found_keywords.len(),
        "Resume scored"
    );

    Ok(ApiResponse::ok(analysis))
}

/// POST /api/career/interview-score - Score a mock-interview answer
///
/// The practice row write must succeed for the call to succeed; a store
/// failure surfaces as a 500 and nothing is retried.
pub async fn score_interview(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<InterviewScoreRequest>,
) -> Result<Json<ApiResponse<InterviewAnalysis>>, ApiError> {
    let state = state_lock.read().await.clone();

    // Validated before any persistence
    let mut result = ValidationResult::new();
    if request.prompt.trim().is_empty() {
        result.add_error("prompt", "Prompt is required");
    }
    if request.response.trim().is_empty() {
        result.add_error("response", "Response is required");
    }
    if let Some(duration) = request.duration {
        if duration < 0 {
            result.add_error("duration", "Duration cannot be negative");
        }
    }
    if !result.is_valid {
        return Err(ApiError::from(result));
    }

    let analysis = analyze_interview_response(&request.response);

    let practice_id = generate_practice_id();
    sqlx::query(
        r#"
        INSERT INTO interview_practices (id, user_id, prompt, response, duration, score, created_at)
        VALUES (?, ?, ?, ?, ?, ?, datetime('now'))
        "#,
    )
    .bind(&practice_id)
    .bind(&authed.id)
    .bind(request.prompt.trim())
    .bind(&request.response)
    .bind(request.duration)
    .bind(analysis.score)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        practice_id = %practice_id,
        score = analysis.score,
        word_count = analysis.word_count,
        "Interview practice recorded"
    );

    Ok(ApiResponse::ok(analysis))
}

/// GET /api/career/stats - Per-user engagement snapshot
///
/// The interview and application aggregates are two independent fetches with
/// no transaction between them; a write landing in between skews the
/// snapshot by at most one record, which is tolerated.
pub async fn get_career_stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ApiResponse<CareerStats>>, ApiError> {
    let state = state_lock.read().await.clone();

    let (interview_count, average_interview_score) = sqlx::query_as::<_, (i64, f64)>(
        "SELECT COUNT(*), COALESCE(AVG(score), 0.0) FROM interview_practices WHERE user_id = ?",
    )
    .bind(&authed.id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let (total_applications, accepted_applications, shortlisted_applications) =
        sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'accepted' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'shortlisted' THEN 1 ELSE 0 END), 0)
            FROM applications
            WHERE user_id = ?
            "#,
        )
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let pulse = confidence_pulse(interview_count, average_interview_score, total_applications);

    debug!(
        user_id = %authed.id,
        interview_count = interview_count,
        total_applications = total_applications,
        confidence_pulse = pulse,
        "Career stats computed"
    );

    Ok(ApiResponse::ok(CareerStats {
        interview_count,
        average_interview_score,
        total_applications,
        accepted_applications,
        shortlisted_applications,
        confidence_pulse: pulse,
    }))
}

/// GET /api/career/interview-history - The caller's practice log, newest first
pub async fn get_interview_history(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ApiResponse<Vec<InterviewPractice>>>, ApiError> {
    let state = state_lock.read().await.clone();

    let practices = sqlx::query_as::<_, InterviewPractice>(
        "SELECT * FROM interview_practices WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(practices))
}
