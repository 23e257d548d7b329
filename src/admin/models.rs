// src/admin/models.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate counts for the admin console
#[derive(Serialize, Debug)]
pub struct AdminStats {
    pub total_users: i64,
    pub users_by_role: HashMap<String, i64>,
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub applications_by_status: HashMap<String, i64>,
    pub total_chapters: i64,
    pub total_interview_practices: i64,
}

#[derive(Serialize, Debug)]
pub struct UserListResponse {
    pub users: Vec<crate::auth::models::UserResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Deserialize, Debug)]
pub struct UserListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateRoleRequest {
    pub role: String,
}
