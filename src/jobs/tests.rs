use super::models::{CreateJob, UpdateJob, UpdateJobStatusRequest};
use super::validators::JobValidator;
use crate::common::Validator;

fn create_request() -> CreateJob {
    CreateJob {
        title: "Backend Engineer".to_string(),
        company: Some("Acme".to_string()),
        location: Some("Remote".to_string()),
        job_type: Some("full_time".to_string()),
        salary_min: Some(90_000),
        salary_max: Some(130_000),
        description: Some("Build the backend.".to_string()),
    }
}

#[test]
fn test_create_job_valid() {
    let validator = JobValidator;
    assert!(validator.validate(&create_request()).is_valid);
}

#[test]
fn test_create_job_requires_title() {
    let validator = JobValidator;
    let mut req = create_request();
    req.title = "  ".to_string();
    let result = validator.validate(&req);
    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|e| e.field == "title"));
}

#[test]
fn test_create_job_rejects_inverted_salary_range() {
    let validator = JobValidator;
    let mut req = create_request();
    req.salary_min = Some(150_000);
    req.salary_max = Some(100_000);
    let result = validator.validate(&req);
    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|e| e.field == "salary_range"));
}

#[test]
fn test_create_job_rejects_unknown_job_type() {
    let validator = JobValidator;
    let mut req = create_request();
    req.job_type = Some("gig".to_string());
    assert!(!validator.validate(&req).is_valid);
}

#[test]
fn test_update_job_allows_partial_fields() {
    let validator = JobValidator;
    let req = UpdateJob {
        title: None,
        company: None,
        location: Some("Berlin".to_string()),
        job_type: None,
        salary_min: None,
        salary_max: None,
        description: None,
    };
    assert!(validator.validate(&req).is_valid);
}

#[test]
fn test_status_must_be_active_or_closed() {
    let validator = JobValidator;
    assert!(validator
        .validate(&UpdateJobStatusRequest {
            status: "active".to_string()
        })
        .is_valid);
    assert!(validator
        .validate(&UpdateJobStatusRequest {
            status: "closed".to_string()
        })
        .is_valid);
    assert!(!validator
        .validate(&UpdateJobStatusRequest {
            status: "archived".to_string()
        })
        .is_valid);
}
