// Jobs module - public catalog and poster CRUD

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::jobs_routes;
