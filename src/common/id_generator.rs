// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., J_K7NP3X for jobs)

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Job posting (J_)
    Job,
    /// Application (A_)
    Application,
    /// Chapter (C_)
    Chapter,
    /// Chapter membership (M_)
    Membership,
    /// Chapter post (P_)
    Post,
    /// Interview practice (I_)
    InterviewPractice,
    /// Token (K_) - K for Key
    Token,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Job => "J",
            EntityPrefix::Application => "A",
            EntityPrefix::Chapter => "C",
            EntityPrefix::Membership => "M",
            EntityPrefix::Post => "P",
            EntityPrefix::InterviewPractice => "I",
            EntityPrefix::Token => "K",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID in format "PREFIX_XXXXXX" (e.g., "J_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix.
/// Used for password-reset token secrets.
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_job_id() -> String {
    generate_id(EntityPrefix::Job)
}

pub fn generate_application_id() -> String {
    generate_id(EntityPrefix::Application)
}

pub fn generate_chapter_id() -> String {
    generate_id(EntityPrefix::Chapter)
}

pub fn generate_membership_id() -> String {
    generate_id(EntityPrefix::Membership)
}

pub fn generate_post_id() -> String {
    generate_id(EntityPrefix::Post)
}

pub fn generate_practice_id() -> String {
    generate_id(EntityPrefix::InterviewPractice)
}

pub fn generate_token_id() -> String {
    generate_id(EntityPrefix::Token)
}
