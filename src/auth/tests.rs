use super::handlers::{hash_password, verify_password};
use super::models::{RegisterRequest, ResetPasswordRequest, Role};
use super::validators::RegistrationValidator;
use crate::common::Validator;

fn register_request(role: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        name: "Priya Shah".to_string(),
        email: "priya@example.com".to_string(),
        password: "correct-horse".to_string(),
        role: role.map(str::to_string),
    }
}

#[test]
fn test_registration_accepts_valid_request() {
    let validator = RegistrationValidator;
    assert!(validator.validate(&register_request(None)).is_valid);
    assert!(validator.validate(&register_request(Some("alumni"))).is_valid);
    assert!(validator.validate(&register_request(Some("student"))).is_valid);
}

#[test]
fn test_registration_rejects_bad_fields() {
    let validator = RegistrationValidator;

    let mut req = register_request(None);
    req.name = "   ".to_string();
    assert!(!validator.validate(&req).is_valid);

    let mut req = register_request(None);
    req.email = "not-an-email".to_string();
    assert!(!validator.validate(&req).is_valid);

    let mut req = register_request(None);
    req.password = "short".to_string();
    assert!(!validator.validate(&req).is_valid);
}

#[test]
fn test_registration_rejects_self_assigned_admin() {
    let validator = RegistrationValidator;
    let result = validator.validate(&register_request(Some("admin")));
    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|e| e.field == "role"));
}

#[test]
fn test_registration_rejects_unknown_role() {
    let validator = RegistrationValidator;
    assert!(!validator.validate(&register_request(Some("wizard"))).is_valid);
}

#[test]
fn test_reset_request_needs_token_and_password() {
    let validator = RegistrationValidator;

    let ok = ResetPasswordRequest {
        token: "SOME32CHARTOKEN".to_string(),
        password: "a-new-password".to_string(),
    };
    assert!(validator.validate(&ok).is_valid);

    let missing_token = ResetPasswordRequest {
        token: "  ".to_string(),
        password: "a-new-password".to_string(),
    };
    assert!(!validator.validate(&missing_token).is_valid);
}

#[test]
fn test_role_round_trip() {
    for role in [
        Role::JobSeeker,
        Role::JobPoster,
        Role::Alumni,
        Role::Student,
        Role::Admin,
    ] {
        assert_eq!(Role::parse(role.as_str()), Some(role));
    }
    assert_eq!(Role::parse("superuser"), None);
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("hunter2hunter2").expect("hashing should succeed");
    assert_ne!(hash, "hunter2hunter2");
    assert!(verify_password("hunter2hunter2", &hash));
    assert!(!verify_password("wrong-password", &hash));
}

#[test]
fn test_verify_password_rejects_garbage_hash() {
    assert!(!verify_password("anything", "not-a-phc-string"));
}
