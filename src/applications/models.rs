// src/applications/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub cover_letter: Option<String>,
    pub status: String,
    pub applied_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An application joined with its job, for the applicant's own list
#[derive(FromRow, Serialize, Debug)]
pub struct ApplicationWithJob {
    pub id: String,
    pub job_id: String,
    pub status: String,
    pub cover_letter: Option<String>,
    pub applied_at: Option<String>,
    pub updated_at: Option<String>,
    pub job_title: String,
    pub job_company: Option<String>,
    pub job_location: Option<String>,
    pub job_status: String,
}

/// An application joined with its applicant, for the poster's per-job list
#[derive(FromRow, Serialize, Debug)]
pub struct ApplicantDetails {
    pub id: String,
    pub user_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub status: String,
    pub cover_letter: Option<String>,
    pub applied_at: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateApplicationRequest {
    pub cover_letter: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateApplicationStatusRequest {
    pub status: String,
}
