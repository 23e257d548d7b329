// src/jobs/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Job Models
// ============================================================================

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct Job {
    pub id: String,
    pub poster_id: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: Option<String>,
    pub status: String,
    pub application_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Paginated job list response
#[derive(Serialize, Debug)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Deserialize, Debug)]
pub struct CreateJob {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateJobStatusRequest {
    pub status: String,
}

/// Search, filter, and pagination parameters for the public catalog
#[derive(Debug, Deserialize)]
pub struct JobQueryParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}
