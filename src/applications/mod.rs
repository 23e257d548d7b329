// Applications module - apply, withdraw, status lifecycle

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::applications_routes;
