// Auth module - registration, login, JWT validation, password reset

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::{require_role, AuthedUser};
pub use models::Role;
pub use routes::auth_routes;
