// src/career/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize, Debug)]
pub struct ResumeScoreRequest {
    pub resume_text: String,
}

#[derive(Deserialize, Debug)]
pub struct InterviewScoreRequest {
    pub prompt: String,
    pub response: String,
    pub duration: Option<i64>,
}

/// A persisted mock-interview attempt. Immutable once created; rows go away
/// only when the owning user is deleted.
#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct InterviewPractice {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub response: String,
    pub duration: Option<i64>,
    pub score: i64,
    pub created_at: Option<String>,
}

/// Derived per-user engagement snapshot, recomputed on every request
#[derive(Serialize, Debug)]
pub struct CareerStats {
    pub interview_count: i64,
    pub average_interview_score: f64,
    pub total_applications: i64,
    pub accepted_applications: i64,
    pub shortlisted_applications: i64,
    pub confidence_pulse: i64,
}
