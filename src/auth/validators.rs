// src/auth/validators.rs

use super::models::{RegisterRequest, ResetPasswordRequest, Role};
use crate::common::{is_valid_email, ValidationResult, Validator};

pub struct RegistrationValidator;

impl Validator<RegisterRequest> for RegistrationValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Name is required");
        } else if data.name.len() > 100 {
            result.add_error("name", "Name must be less than 100 characters");
        }

        if !is_valid_email(&data.email) {
            result.add_error("email", "A valid email address is required");
        }

        validate_password(&data.password, &mut result);

        if let Some(role) = &data.role {
            match Role::parse(role) {
                None => result.add_error("role", "Unknown role"),
                // Admin accounts are provisioned via ADMIN_EMAILS, never
                // self-assigned.
                Some(Role::Admin) => result.add_error("role", "Role cannot be self-assigned"),
                Some(_) => {}
            }
        }

        result
    }
}

impl Validator<ResetPasswordRequest> for RegistrationValidator {
    fn validate(&self, data: &ResetPasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.token.trim().is_empty() {
            result.add_error("token", "Reset token is required");
        }

        validate_password(&data.password, &mut result);

        result
    }
}

fn validate_password(password: &str, result: &mut ValidationResult) {
    if password.len() < 8 {
        result.add_error("password", "Password must be at least 8 characters");
    } else if password.len() > 128 {
        result.add_error("password", "Password must be less than 128 characters");
    }
}
