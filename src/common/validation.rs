// Common validation types and traits

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Validates ID format - accepts both UUIDs and prefixed Crockford IDs
/// (e.g., J_XXXXXX, A_XXXXXX)
pub fn is_valid_entity_id(id_str: &str) -> bool {
    if uuid::Uuid::parse_str(id_str).is_ok() {
        return true;
    }

    if id_str.len() >= 3 && id_str.chars().nth(1) == Some('_') {
        let prefix = id_str.chars().next().unwrap_or(' ');
        let suffix = &id_str[2..];

        let valid_prefixes = ['U', 'J', 'A', 'C', 'M', 'P', 'I', 'K'];
        if valid_prefixes.contains(&prefix) && !suffix.is_empty() {
            // Crockford Base32 alphabet (excludes I, L, O, U)
            let crockford_chars = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";
            return suffix
                .chars()
                .all(|c| crockford_chars.contains(c.to_ascii_uppercase()));
        }
    }

    false
}

/// Minimal email shape check used by registration and profile updates
pub fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    if trimmed.len() < 5 || trimmed.len() > 254 {
        return false;
    }
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
