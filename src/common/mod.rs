// Common module - shared types and utilities

pub mod error;
pub mod id_generator;
pub mod migrations;
pub mod response;
pub mod state;
pub mod validation;

pub use error::{is_unique_violation, ApiError};
pub use id_generator::{
    generate_application_id, generate_chapter_id, generate_job_id, generate_membership_id,
    generate_post_id, generate_practice_id, generate_raw_id, generate_token_id, generate_user_id,
};
pub use response::{ApiResponse, MessageResponse};
pub use state::AppState;
pub use validation::{is_valid_email, is_valid_entity_id, ValidationResult, Validator};

/// Mask an email address for log output (keeps first char and domain)
pub fn safe_email_log(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().unwrap_or('*');
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
