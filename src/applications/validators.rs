// src/applications/validators.rs

use super::models::{CreateApplicationRequest, UpdateApplicationStatusRequest};
use crate::common::{ValidationResult, Validator};
use std::collections::HashSet;

/// The five application states. Transitions are poster/admin-initiated,
/// single-step, and any-to-any (a later call may overwrite any earlier
/// state).
pub const APPLICATION_STATUSES: [&str; 5] =
    ["pending", "reviewed", "shortlisted", "rejected", "accepted"];

pub struct ApplicationValidator;

impl Validator<CreateApplicationRequest> for ApplicationValidator {
    fn validate(&self, data: &CreateApplicationRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(cover_letter) = &data.cover_letter {
            if cover_letter.len() > 5000 {
                result.add_error(
                    "cover_letter",
                    "Cover letter must be less than 5000 characters",
                );
            }
        }

        result
    }
}

impl Validator<UpdateApplicationStatusRequest> for ApplicationValidator {
    fn validate(&self, data: &UpdateApplicationStatusRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let valid_statuses: HashSet<&str> = APPLICATION_STATUSES.into_iter().collect();
        if !valid_statuses.contains(data.status.as_str()) {
            result.add_error("status", "Invalid application status");
        }

        result
    }
}
