// src/jobs/validators.rs

use super::models::{CreateJob, UpdateJob, UpdateJobStatusRequest};
use crate::common::{ValidationResult, Validator};
use std::collections::HashSet;

pub const JOB_TYPES: [&str; 4] = ["full_time", "part_time", "internship", "contract"];

pub struct JobValidator;

impl Validator<CreateJob> for JobValidator {
    fn validate(&self, data: &CreateJob) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Title is required");
        } else if data.title.len() > 200 {
            result.add_error("title", "Title must be less than 200 characters");
        }

        validate_job_type(data.job_type.as_deref(), &mut result);
        validate_salary_range(data.salary_min, data.salary_max, &mut result);

        if let Some(description) = &data.description {
            if description.len() > 10_000 {
                result.add_error(
                    "description",
                    "Description must be less than 10000 characters",
                );
            }
        }

        result
    }
}

impl Validator<UpdateJob> for JobValidator {
    fn validate(&self, data: &UpdateJob) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                result.add_error("title", "Title cannot be blank");
            } else if title.len() > 200 {
                result.add_error("title", "Title must be less than 200 characters");
            }
        }

        validate_job_type(data.job_type.as_deref(), &mut result);
        validate_salary_range(data.salary_min, data.salary_max, &mut result);

        result
    }
}

impl Validator<UpdateJobStatusRequest> for JobValidator {
    fn validate(&self, data: &UpdateJobStatusRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let valid_statuses = HashSet::from(["active", "closed"]);
        if !valid_statuses.contains(data.status.as_str()) {
            result.add_error("status", "Status must be 'active' or 'closed'");
        }

        result
    }
}

fn validate_job_type(job_type: Option<&str>, result: &mut ValidationResult) {
    if let Some(job_type) = job_type {
        if !JOB_TYPES.contains(&job_type) {
            result.add_error(
                "job_type",
                "Job type must be one of full_time, part_time, internship, contract",
            );
        }
    }
}

fn validate_salary_range(min: Option<i64>, max: Option<i64>, result: &mut ValidationResult) {
    if let Some(min) = min {
        if min < 0 {
            result.add_error("salary_min", "Salary cannot be negative");
        }
    }
    if let Some(max) = max {
        if max < 0 {
            result.add_error("salary_max", "Salary cannot be negative");
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            result.add_error("salary_range", "Minimum salary cannot exceed maximum");
        }
    }
}
