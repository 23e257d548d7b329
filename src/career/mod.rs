// Career module - resume scoring, interview practice, confidence pulse

pub mod handlers;
pub mod models;
pub mod routes;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use routes::career_routes;
